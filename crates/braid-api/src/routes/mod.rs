pub mod blockchain;
pub mod nodes;
pub mod transactions;
pub mod wallets;

use braid_state::BlockEvent;

use crate::SharedContext;

/// Fan confirmed blocks out to the captured neighbor list, off the
/// request path and outside the chain lock.
pub(crate) fn gossip_confirmed(
    context: &SharedContext,
    neighbors: Vec<String>,
    event: &BlockEvent,
) {
    if event.confirmed.is_empty() || neighbors.is_empty() {
        return;
    }
    let blocks = event.confirmed.clone();
    let context = context.clone();
    tokio::spawn(async move {
        for block in &blocks {
            context.peers.broadcast_block(&neighbors, block).await;
        }
    });
}
