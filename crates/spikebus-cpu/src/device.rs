//! Device description for the CPU backend

use core::fmt;

use spikebus_core::Uid;

/// Description of the processing device a backend runs on.
///
/// Hardware enumeration is out of scope for the core; this record describes
/// the one logical CPU device the backend computes on.
#[derive(Debug, Clone)]
pub struct CpuDevice {
    uid: Uid,
    name: String,
    worker_count: usize,
}

impl CpuDevice {
    /// Describe a CPU device with `worker_count` workers.
    pub fn new(name: impl Into<String>, worker_count: usize) -> Self {
        Self {
            uid: Uid::new(),
            name: name.into(),
            worker_count,
        }
    }

    /// UID of this device.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Human-readable device name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Number of worker threads the backend runs on this device.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl fmt::Display for CpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} workers)", self.name, self.worker_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_description() {
        let device = CpuDevice::new("CPU", 4);
        assert_eq!(device.get_name(), "CPU");
        assert_eq!(device.worker_count(), 4);
        assert_eq!(format!("{}", device), "CPU (4 workers)");
    }
}
