/// The sync layer's belief about connectivity to the backing service.
///
/// `Unknown` is the initial state and is treated as potentially online:
/// it resolves to `Online` or `Offline` once the sync layer has evidence
/// either way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnlineState {
    #[default]
    Unknown,
    Online,
    Offline,
}
