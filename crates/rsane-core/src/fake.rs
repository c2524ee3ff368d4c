//! Minimal in-crate device used by unit tests

use crate::backend::DeviceHandle;
use crate::error::{Error, Result};
use crate::frame::{ColorMode, FrameParameters, ReadStatus};
use crate::option::{Capabilities, Constraint, OptionDescriptor, SetInfo, Value, ValueType};

/// Values stored per option index; frame served from `frame` in `chunk`-sized reads
pub(crate) struct FakeDevice {
    pub descriptors: Vec<OptionDescriptor>,
    pub values: Vec<Value>,
    pub params: FrameParameters,
    pub frame: Vec<u8>,
    pub chunk: usize,
    pub offset: usize,
    pub fail_read: bool,
    pub gets: usize,
    pub sets: usize,
    pub starts: usize,
    pub cancels: usize,
}

impl FakeDevice {
    pub fn new() -> Self {
        let descriptors = vec![
            OptionDescriptor::new("mode", ValueType::String).constraint(Constraint::StringList(
                vec!["Gray".into(), "Color".into()],
            )),
            OptionDescriptor::new("resolution", ValueType::Int).constraint(Constraint::IntRange {
                min: 50,
                max: 1200,
                quant: 1,
            }),
            OptionDescriptor::new("br-x", ValueType::Float).constraint(Constraint::FloatRange {
                min: 0.0,
                max: 200.0,
                quant: 0.0,
            }),
            OptionDescriptor::new("scan", ValueType::Trigger)
                .capabilities(Capabilities::SOFT_DETECT | Capabilities::HARD_SELECT),
            OptionDescriptor::new("depth", ValueType::Int)
                .capabilities(Capabilities::default() | Capabilities::INACTIVE),
            // Reports the wrong type on read
            OptionDescriptor::new("broken", ValueType::Int),
        ];
        let values = vec![
            Value::from("Gray"),
            Value::Int(300),
            Value::Float(100.0),
            Value::Bool(false),
            Value::Int(8),
            Value::from("oops"),
        ];
        let params = FrameParameters {
            mode: ColorMode::Gray,
            depth: 8,
            bytes_per_line: 4,
            pixels_per_line: 4,
            lines: Some(2),
        };
        Self {
            descriptors,
            values,
            params,
            frame: vec![0; 8],
            chunk: 3,
            offset: 0,
            fail_read: false,
            gets: 0,
            sets: 0,
            starts: 0,
            cancels: 0,
        }
    }
}

impl DeviceHandle for FakeDevice {
    fn option_descriptors(&mut self) -> Result<Vec<OptionDescriptor>> {
        Ok(self.descriptors.clone())
    }

    fn get_option(&mut self, index: usize) -> Result<Value> {
        self.gets += 1;
        Ok(self.values[index].clone())
    }

    fn set_option(&mut self, index: usize, value: &Value) -> Result<SetInfo> {
        self.sets += 1;
        self.values[index] = value.clone();
        Ok(SetInfo::RELOAD_PARAMS)
    }

    fn start(&mut self) -> Result<()> {
        self.starts += 1;
        self.offset = 0;
        Ok(())
    }

    fn parameters(&mut self) -> Result<FrameParameters> {
        Ok(self.params)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        if self.fail_read {
            return Err(Error::Io("read failed".into()));
        }
        let remaining = self.frame.len() - self.offset;
        if remaining == 0 {
            return Ok(ReadStatus::EndOfFrame);
        }
        let n = remaining.min(buf.len()).min(self.chunk);
        buf[..n].copy_from_slice(&self.frame[self.offset..self.offset + n]);
        self.offset += n;
        Ok(ReadStatus::Data(n))
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}
