//! Field assembly for a single log call.
//!
//! Call arguments come first, context fields second; neither source is
//! de-duplicated against the other. Error values are then expanded in place.

use ctxlog_ports::{LogValue, StructuredError};

/// Merge call arguments with context fields and expand error values.
pub(crate) fn assemble(args: &[LogValue], context: &[LogValue]) -> Vec<LogValue> {
    let mut fields = Vec::with_capacity(args.len() + context.len());
    fields.extend_from_slice(args);
    fields.extend_from_slice(context);
    expand_errors(&mut fields);
    fields
}

/// Replace every error at a value position with its message.
///
/// Structured errors also append their tuples, skipping keys already present
/// in a complete pair. The length is re-read on every step, so appended
/// values are expanded too.
pub(crate) fn expand_errors(fields: &mut Vec<LogValue>) {
    let mut index = 1;
    while index < fields.len() {
        let error = fields.get(index).and_then(LogValue::as_error).cloned();
        if let Some(error) = error {
            let tuples = error.as_structured().map(StructuredError::tuples);
            if let Some(slot) = fields.get_mut(index) {
                *slot = LogValue::from(error.message());
            }
            for pair in tuples.iter().flat_map(|tuples| tuples.chunks_exact(2)) {
                let [key, value] = pair else {
                    continue;
                };
                if !key_present(fields, key) {
                    fields.push(key.clone());
                    fields.push(value.clone());
                }
            }
        }
        index += 2;
    }
}

fn key_present(fields: &[LogValue], key: &LogValue) -> bool {
    let Some(name) = key.as_key() else {
        return false;
    };
    fields
        .chunks_exact(2)
        .any(|pair| pair.first().and_then(LogValue::as_key) == Some(name))
}
