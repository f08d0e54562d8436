use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier handed to the renderer for one render invocation.
///
/// Built from the wall clock plus a random component so that overlapping
/// renders never share an element id and the renderer cannot serve a cached
/// result for a previous diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderId(String);

impl RenderId {
    /// Fresh id for one render
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let random: u64 = rand::random::<u64>() & 0xf_ffff_ffff;
        Self(format!("diagram-{millis}-{random:09x}"))
    }

    /// Id as handed to the renderer
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
