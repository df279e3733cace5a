/// Write-only sink for human-readable pipeline status lines.
///
/// Delivery is fire-and-forget: implementations must tolerate many calls and
/// must not influence control flow.
pub trait ProgressSink {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Sink that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn report(&self, _message: &str) {}
}
