//! Hub command handlers.

use powerview_core::{Hub, UserData};

use crate::cli::{GlobalOpts, HubArgs, HubCommand};
use crate::error::CliError;
use crate::output;

fn detail(u: &UserData) -> String {
    [
        format!("Name:   {}", u.hub_name.as_deref().unwrap_or("-")),
        format!("Serial: {}", u.serial_number.as_deref().unwrap_or("-")),
        format!("MAC:    {}", u.mac_address.as_deref().unwrap_or("-")),
        format!("IP:     {}", u.ip.as_deref().unwrap_or("-")),
        format!("RF ID:  {}", u.rf_id.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

pub async fn handle(hub: &Hub, args: HubArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        HubCommand::Info => {
            let info = hub.user_data().await?;
            let out = output::render(global.format(), &info, detail, |u| {
                u.serial_number.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
