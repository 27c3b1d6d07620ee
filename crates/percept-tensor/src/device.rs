use crate::error::TensorError;

/// Device families a tensor can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    /// Host memory, served by the system allocator.
    Cpu,
    /// CUDA device memory.
    Cuda,
}

/// Placement tag for tensor storage: a device kind plus an index.
///
/// All `cpu:N` devices are served by the same host backend; the index is a
/// placement label, so pipelines can keep stages on distinct logical
/// devices and rely on the device-equality checks in the kernels. Tensors
/// never migrate between devices implicitly; the only crossing is
/// [`Tensor::to_device`](crate::Tensor::to_device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    kind: DeviceKind,
    index: usize,
}

impl Device {
    /// The default host device, `cpu:0`.
    pub const CPU: Device = Device::cpu(0);

    /// Creates a host device with the given index.
    pub const fn cpu(index: usize) -> Self {
        Self {
            kind: DeviceKind::Cpu,
            index,
        }
    }

    /// Creates a CUDA device tag with the given index.
    pub const fn cuda(index: usize) -> Self {
        Self {
            kind: DeviceKind::Cuda,
            index,
        }
    }

    /// Returns the device kind.
    pub const fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the device index.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns true if the device is a host device.
    pub const fn is_cpu(&self) -> bool {
        matches!(self.kind, DeviceKind::Cpu)
    }

    /// Returns true if the device is an accelerator device.
    pub const fn is_accelerator(&self) -> bool {
        !self.is_cpu()
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::CPU
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Cuda => "cuda",
        };
        write!(f, "{}:{}", kind, self.index)
    }
}

impl std::str::FromStr for Device {
    type Err = TensorError;

    /// Parses `"cpu"`, `"cpu:1"`, `"cuda:0"` and the like. A missing
    /// index defaults to 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = match s.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| TensorError::InvalidDevice(s.to_string()))?;
                (kind, index)
            }
            None => (s, 0),
        };
        match kind {
            "cpu" => Ok(Device::cpu(index)),
            "cuda" => Ok(Device::cuda(index)),
            _ => Err(TensorError::InvalidDevice(s.to_string())),
        }
    }
}
