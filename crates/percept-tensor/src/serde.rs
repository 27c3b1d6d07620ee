//! Serialization support for host tensors.
//!
//! Tensors serialize as shape, dtype, device and raw bytes. Only
//! contiguous host tensors can be serialized; deserialization validates
//! the byte count against the shape and dtype before allocating.

use serde::ser::SerializeStruct;
use serde::Deserialize;

use crate::{device::Device, dtype::Dtype, tensor::Tensor};

impl serde::Serialize for Tensor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let data = self.as_bytes().map_err(serde::ser::Error::custom)?;
        let mut state = serializer.serialize_struct("Tensor", 4)?;
        state.serialize_field("shape", self.shape())?;
        state.serialize_field("dtype", &self.dtype())?;
        state.serialize_field("device", &self.device())?;
        state.serialize_field("data", data)?;
        state.end()
    }
}

impl<'de> serde::Deserialize<'de> for Tensor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TensorData {
            shape: Vec<usize>,
            dtype: Dtype,
            device: Device,
            data: Vec<u8>,
        }

        let TensorData {
            shape,
            dtype,
            device,
            data,
        } = TensorData::deserialize(deserializer)?;

        Tensor::from_bytes(&shape, dtype, data, &device).map_err(serde::de::Error::custom)
    }
}
