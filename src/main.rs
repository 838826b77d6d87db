use std::error::Error;

use identity_shield::{logging, Shield, ShieldConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ShieldConfig::from_env()?;
    logging::init(config.log_level);

    let shield = Shield::start(&config)?;
    match std::env::args().nth(1).as_deref() {
        None | Some("status") => {}
        Some("reset") => {
            shield.reset();
        }
        Some(other) => return Err(format!("unknown command '{other}' (expected status or reset)").into()),
    }

    println!("{}", shield.status());
    shield.shutdown();
    Ok(())
}
