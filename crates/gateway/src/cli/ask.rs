//! `strata ask`: one chat turn from the command line.
//!
//! Boots the same state the server uses, runs a single turn, prints the
//! reply, and flushes the stores so the turn survives the process.

use std::sync::Arc;

use st_domain::config::Config;
use st_store::Selection;

use crate::bootstrap;
use crate::runtime::{run_chat, ChatRequest};

pub struct AskArgs {
    pub message: String,
    pub endpoint: Option<String>,
    pub domain: Option<String>,
    pub site: Option<String>,
    pub conversation: Option<String>,
    pub json: bool,
}

pub async fn run(config: Arc<Config>, args: AskArgs) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config).await?;

    // Without an explicit endpoint, use whatever the picker would show.
    let endpoint_id = match args.endpoint {
        Some(id) => id,
        None => state
            .resolver
            .resolve(&Selection {
                active_domain: args.domain.clone(),
                ..Default::default()
            })
            .await?
            .map(|r| r.endpoint.id)
            .ok_or_else(|| anyhow::anyhow!("no endpoint available, pass --endpoint"))?,
    };

    let reply = run_chat(
        &state,
        ChatRequest {
            message: args.message,
            conversation_id: args.conversation,
            endpoint_id,
            domain_id: args.domain,
            site_id: args.site,
        },
    )
    .await?;

    if args.json {
        let json = serde_json::to_string_pretty(&reply)
            .map_err(|e| anyhow::anyhow!("serializing reply: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", reply.message.content);
        eprintln!("\x1b[2m[conversation: {}]\x1b[0m", reply.conversation_id);
    }

    bootstrap::flush_stores(&state).await;
    Ok(())
}
