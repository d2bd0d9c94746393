use crate::chiave;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Reject malformed connection strings before touching the pool.
            let dsn = Url::parse(&dsn)?;

            chiave::new(port, dsn.to_string(), globals).await?;
        }
    }

    Ok(())
}
