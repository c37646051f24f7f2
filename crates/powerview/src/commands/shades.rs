//! Shade command handlers.

use futures_util::future::join_all;
use tabled::Tabled;

use powerview_core::{Hub, PositionKind, Shade, ShadeId, position_from_percent, position_to_percent};

use crate::cli::{GlobalOpts, MoveArgs, ShadesArgs, ShadesCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShadeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Bottom")]
    bottom: String,
    #[tabled(rename = "Top")]
    top: String,
    #[tabled(rename = "Vanes")]
    vanes: String,
    #[tabled(rename = "Battery")]
    battery: String,
}

fn percent(s: &Shade, kind: PositionKind) -> String {
    s.positions
        .get(kind)
        .map_or_else(|| "-".into(), |v| format!("{}%", position_to_percent(v)))
}

impl From<&Shade> for ShadeRow {
    fn from(s: &Shade) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone().unwrap_or_default(),
            room: s.room_id.map(|r| r.to_string()).unwrap_or_default(),
            bottom: percent(s, PositionKind::Bottom),
            top: percent(s, PositionKind::Top),
            vanes: percent(s, PositionKind::Vanes),
            battery: s.battery_strength.map(|b| b.to_string()).unwrap_or_default(),
        }
    }
}

fn detail(s: &Shade) -> String {
    let mut lines = vec![
        format!("ID:      {}", s.id),
        format!("Name:    {}", s.name.as_deref().unwrap_or("-")),
        format!(
            "Room:    {}",
            s.room_id.map_or_else(|| "-".into(), |r| r.to_string())
        ),
    ];
    for (kind, value) in s.positions.iter() {
        let label = format!("{kind}:");
        lines.push(format!("{label:<8} {}% ({value})", position_to_percent(value)));
    }
    if let Some(battery) = s.battery_strength {
        lines.push(format!("Battery: {battery}"));
    }
    lines.join("\n")
}

fn print_shade(shade: &Shade, global: &GlobalOpts) {
    let out = output::render(global.format(), shade, detail, |s| s.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Move ────────────────────────────────────────────────────────────

/// Convert the `move` flags into `(kind, raw position)` pairs.
fn move_targets(args: &MoveArgs) -> Result<Vec<(PositionKind, u16)>, CliError> {
    let requested = [
        (PositionKind::Bottom, args.bottom),
        (PositionKind::Top, args.top),
        (PositionKind::Vanes, args.vanes),
    ];

    let mut targets = Vec::new();
    for (kind, value) in requested {
        let Some(value) = value else { continue };
        let raw = if args.raw {
            u16::try_from(value).map_err(|_| CliError::Validation {
                field: kind.to_string(),
                reason: format!("raw position {value} exceeds {}", u16::MAX),
            })?
        } else {
            let pct = u8::try_from(value).map_err(|_| CliError::Validation {
                field: kind.to_string(),
                reason: format!("{value}% is not a percentage"),
            })?;
            position_from_percent(pct)?
        };
        targets.push((kind, raw));
    }

    if targets.is_empty() {
        return Err(CliError::Validation {
            field: "move".into(),
            reason: "give at least one of --bottom, --top or --vanes".into(),
        });
    }
    Ok(targets)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: ShadesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ShadesCommand::List => {
            let shades = hub.shades().await?;
            let out = output::render(
                global.format(),
                shades.as_slice(),
                |list| output::table(list.iter().map(ShadeRow::from)),
                |list| {
                    list.iter()
                        .map(|s| s.id.to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShadesCommand::Get { shade } => {
            let found = hub
                .shade(ShadeId(shade))
                .await
                .map_err(|e| CliError::for_shade(e, shade))?;
            print_shade(&found, global);
            Ok(())
        }

        ShadesCommand::Refresh { shade } => {
            let refreshed = hub
                .refresh_shade(ShadeId(shade))
                .await
                .map_err(|e| CliError::for_shade(e, shade))?;
            print_shade(&refreshed, global);
            Ok(())
        }

        ShadesCommand::Move(args) => {
            let targets = move_targets(&args)?;
            let id = ShadeId(args.shade);

            // Submitted together so the queue folds them into one request.
            let results = join_all(
                targets
                    .iter()
                    .map(|&(kind, value)| hub.set_position(id, kind, value, true)),
            )
            .await;

            let mut last = None;
            for result in results {
                last = Some(result.map_err(|e| CliError::for_shade(e, args.shade))?);
            }
            if let Some(shade) = last {
                print_shade(&shade, global);
            }
            Ok(())
        }

        ShadesCommand::Jog { shade } => {
            let moved = hub
                .jog(ShadeId(shade))
                .await
                .map_err(|e| CliError::for_shade(e, shade))?;
            if !global.quiet {
                eprintln!("Shade {} jogged", moved.id);
            }
            Ok(())
        }

        ShadesCommand::Calibrate { shade } => {
            let calibrated = hub
                .calibrate(ShadeId(shade))
                .await
                .map_err(|e| CliError::for_shade(e, shade))?;
            if !global.quiet {
                eprintln!("Shade {} calibration started", calibrated.id);
            }
            Ok(())
        }
    }
}
