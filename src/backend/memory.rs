use gfx_hal::{adapter::MemoryType, buffer, memory as m, prelude::*, Backend, Limits, MemoryTypeId};
use std::iter;
use std::ptr;

use crate::error::Error;

/// A buffer bound to its own CPU-visible memory block.
pub struct Allocation<B: Backend> {
    pub buffer: B::Buffer,
    memory: B::Memory,
    pub size: u64,
}

impl<B: Backend> Allocation<B> {
    pub fn new(
        device: &B::Device,
        size: u64,
        usage: buffer::Usage,
        memory_types: &[MemoryType],
        limits: &Limits,
    ) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::resource("buffer", "zero-sized buffer"));
        }
        let non_coherent_alignment = limits.non_coherent_atom_size as u64;
        let memory_size = ((size + non_coherent_alignment - 1) / non_coherent_alignment)
            * non_coherent_alignment;

        unsafe {
            let mut buffer = device
                .create_buffer(memory_size, usage)
                .map_err(|err| Error::resource_failed("buffer", err))?;
            let buffer_req = device.get_buffer_requirements(&buffer);
            let upload_type = Self::upload_type(memory_types, &buffer_req)
                .ok_or_else(|| Error::resource("buffer memory", "no CPU-visible memory type"))?;
            let memory = device
                .allocate_memory(upload_type, buffer_req.size)
                .map_err(|err| Error::resource_failed("buffer memory", err))?;
            device
                .bind_buffer_memory(&memory, 0, &mut buffer)
                .map_err(|err| Error::resource_failed("buffer memory", err))?;

            Ok(Allocation {
                buffer,
                memory,
                size,
            })
        }
    }

    /// Copies `data` into the buffer through a temporary mapping.
    pub fn write(&self, device: &B::Device, offset: u64, data: &[u8]) -> Result<(), Error> {
        if offset + data.len() as u64 > self.size {
            return Err(Error::resource("buffer", "upload past end of buffer"));
        }
        unsafe {
            let mapping = device
                .map_memory(&self.memory, m::Segment::ALL)
                .map_err(|err| Error::resource_failed("buffer mapping", err))?;
            ptr::copy_nonoverlapping(data.as_ptr(), mapping.add(offset as usize), data.len());
            device
                .flush_mapped_memory_ranges(iter::once((&self.memory, m::Segment::ALL)))
                .map_err(|err| Error::resource_failed("buffer mapping", err))?;
            device.unmap_memory(&self.memory);
        }
        Ok(())
    }

    pub unsafe fn destroy(self, device: &B::Device) {
        device.destroy_buffer(self.buffer);
        device.free_memory(self.memory);
    }

    fn upload_type(properties: &[MemoryType], buffer_req: &m::Requirements) -> Option<MemoryTypeId> {
        properties
            .iter()
            .enumerate()
            .position(|(id, mem_type)| {
                buffer_req.type_mask & (1 << id) != 0
                    && mem_type.properties.contains(m::Properties::CPU_VISIBLE)
            })
            .map(MemoryTypeId::from)
    }
}
