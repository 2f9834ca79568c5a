use sillage_types::{Span, SpanContext, Transaction};
use tracing::trace;

/// Adds a child span to `transaction`, pulling the transaction's start back
/// when the child begins earlier. A transaction always covers its children.
pub fn start_child<'t>(transaction: &'t mut Transaction, context: SpanContext) -> &'t Span {
    if context.start_timestamp < transaction.start_timestamp() {
        trace!(
            from = transaction.start_timestamp(),
            to = context.start_timestamp,
            description = %context.description,
            "pulling transaction start back to cover child"
        );
        transaction.set_start_timestamp(context.start_timestamp);
    }
    transaction.start_child(context)
}
