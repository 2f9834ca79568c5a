use facet::Facet;

/// Client network and hardware details captured for page loads.
#[derive(Facet, Debug, Clone, Default, PartialEq)]
pub struct BrowserContext {
    /// Network connection class as reported by the client (`4g`, `3g`, ...).
    pub effective_connection_type: Option<String>,
    /// Approximate device memory in gigabytes.
    pub device_memory: Option<f64>,
    /// Number of logical processors.
    pub hardware_concurrency: Option<u32>,
}

impl BrowserContext {
    pub fn is_empty(&self) -> bool {
        self.effective_connection_type.is_none()
            && self.device_memory.is_none()
            && self.hardware_concurrency.is_none()
    }
}

/// A named context record attached to a transaction.
#[derive(Facet, Debug, Clone, PartialEq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum Context {
    Browser(BrowserContext),
}
