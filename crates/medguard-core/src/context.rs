//! Request Context: who asked, from where, under which trace id

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: String,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            device_id: None,
            ip_address: None,
        }
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
