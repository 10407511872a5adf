//! # Buffer State Module
//!
//! This module provides a centralized registry for the viewer's GPU buffers.
//! It handles buffer creation, partial writes, whole-buffer streaming and
//! usage analytics.
//!
//! ## Architecture
//!
//! The `BufferState` struct owns every buffer the renderer binds. Buffers are
//! referenced by name (static string). Per-frame data such as the instance
//! transforms goes through `stream_buffer`, which replaces the whole contents
//! and grows the allocation when the new data no longer fits.

use std::collections::HashMap;

use log::{debug, error};
use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, Queue};

use crate::core::StSystem;

/// GPU copies must be a multiple of this many bytes
const COPY_ALIGNMENT: u64 = wgpu::COPY_BUFFER_ALIGNMENT;

/// Analytics data for a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Bytes holding live data after the last write
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
    /// Number of times the buffer was recreated to fit larger data
    pub times_reallocated: u64,
}

impl BufferAnalytics {
    /// Accounts for writing `len` bytes at `offset`.
    ///
    /// Returns `false` without changing anything if the write would run past
    /// the allocation.
    pub fn record_write(&mut self, offset: u64, len: u64) -> bool {
        match offset.checked_add(len) {
            Some(end) if end <= self.allocated_memory => {
                self.used_memory = self.used_memory.max(end);
                self.times_written += 1;
                true
            }
            _ => false,
        }
    }

    /// Accounts for replacing the whole buffer with `len` bytes.
    ///
    /// Returns the new allocation size when the buffer has to be recreated.
    /// Empty streams are not counted as writes.
    pub fn record_stream(&mut self, len: u64) -> Option<u64> {
        let grown = needs_reallocation(self.allocated_memory, len).then(|| aligned_capacity(len));
        if let Some(size) = grown {
            self.allocated_memory = size;
            self.times_reallocated += 1;
        }

        self.used_memory = len;
        if len > 0 {
            self.times_written += 1;
        }
        grown
    }
}

/// Rounds `len` up to the copy alignment. Never returns zero so an empty
/// stream still leaves a bindable buffer behind.
pub fn aligned_capacity(len: u64) -> u64 {
    let len = len.max(COPY_ALIGNMENT);
    len.div_ceil(COPY_ALIGNMENT) * COPY_ALIGNMENT
}

/// Whether a buffer of `allocated` bytes must be recreated to hold `len` bytes.
pub fn needs_reallocation(allocated: u64, len: u64) -> bool {
    aligned_capacity(len) > allocated
}

/// Central manager for GPU buffers
///
/// # Examples
///
/// ```ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer_init(
///     "vertex_buffer",
///     wgpu::util::BufferInitDescriptor {
///         label: Some("Vertex Buffer"),
///         contents: bytemuck::cast_slice(&vertices),
///         usage: wgpu::BufferUsages::VERTEX,
///     },
/// );
///
/// let vertex_buffer = buffer_state.get_buffer("vertex_buffer");
/// ```
pub struct BufferState {
    /// Reference to the GPU device
    device: StSystem<Device>,
    /// Reference to the GPU command queue
    queue: StSystem<Queue>,
    /// Map of buffer names to buffer objects and their usages
    buffers: HashMap<&'static str, (Buffer, BufferUsages)>,
    /// Analytics data for each buffer
    buffer_analytics: HashMap<&'static str, BufferAnalytics>,
}

impl BufferState {
    /// Creates a new buffer state manager with no buffers.
    pub fn new(device: StSystem<Device>, queue: StSystem<Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
        }
    }

    /// Creates an empty buffer with the specified descriptor
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Unique name for the buffer
    /// * `buffer_descriptor` - Buffer configuration descriptor
    pub fn create_buffer(
        &mut self,
        buffer_name: &'static str,
        buffer_descriptor: wgpu::BufferDescriptor,
    ) {
        let buffer_analytics = BufferAnalytics {
            allocated_memory: buffer_descriptor.size,
            used_memory: 0,
            times_written: 0,
            times_reallocated: 0,
        };
        let buffer = self.device.get().create_buffer(&buffer_descriptor);

        self.buffers
            .insert(buffer_name, (buffer, buffer_descriptor.usage));
        self.buffer_analytics.insert(buffer_name, buffer_analytics);
    }

    /// Creates a buffer and initializes it with data
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Unique name for the buffer
    /// * `init_descriptor` - Buffer initialization descriptor with data
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let buffer_analytics = BufferAnalytics {
            allocated_memory: init_descriptor.contents.len() as u64,
            used_memory: init_descriptor.contents.len() as u64,
            times_written: 1,
            times_reallocated: 0,
        };
        let buffer = self.device.get().create_buffer_init(&init_descriptor);

        self.buffers
            .insert(buffer_name, (buffer, init_descriptor.usage));
        self.buffer_analytics.insert(buffer_name, buffer_analytics);
    }

    /// Writes raw byte data into part of a buffer.
    ///
    /// Writes to unknown buffers or past the end of the allocation are logged
    /// and dropped.
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Name of the buffer to write to
    /// * `offset` - Byte offset in the buffer to start writing
    /// * `data` - Raw byte data to write
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) {
        let (Some((buffer, _)), Some(buffer_analytics)) = (
            self.buffers.get(buffer_name),
            self.buffer_analytics.get_mut(buffer_name),
        ) else {
            error!("Write to unknown buffer '{}'", buffer_name);
            return;
        };

        if !buffer_analytics.record_write(offset, data.len() as u64) {
            error!(
                "Buffer write out of bounds for buffer name '{}'",
                buffer_name
            );
            return;
        }

        self.queue.get().write_buffer(buffer, offset, data);
    }

    /// Replaces the whole contents of a buffer.
    ///
    /// The buffer is recreated with the same usage when `data` is larger than
    /// its allocation. Empty data only resets the used size; nothing is sent
    /// to the GPU.
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Name of the buffer to replace
    /// * `data` - The new contents
    pub fn stream_buffer(&mut self, buffer_name: &'static str, data: &[u8]) {
        let (Some((buffer, usage)), Some(buffer_analytics)) = (
            self.buffers.get_mut(buffer_name),
            self.buffer_analytics.get_mut(buffer_name),
        ) else {
            error!("Stream to unknown buffer '{}'", buffer_name);
            return;
        };

        let data_size = data.len() as u64;
        let previous_size = buffer_analytics.allocated_memory;
        if let Some(size) = buffer_analytics.record_stream(data_size) {
            debug!(
                "Growing buffer '{}' from {} to {} bytes (reallocation {})",
                buffer_name, previous_size, size, buffer_analytics.times_reallocated
            );
            *buffer = self.device.get().create_buffer(&wgpu::BufferDescriptor {
                label: Some(buffer_name),
                size,
                usage: *usage,
                mapped_at_creation: false,
            });
        }

        if data.is_empty() {
            return;
        }

        // write_buffer needs a 4-byte multiple; pad the tail if the caller didn't
        if data_size % COPY_ALIGNMENT == 0 {
            self.queue.get().write_buffer(buffer, 0, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(aligned_capacity(data_size) as usize, 0);
            self.queue.get().write_buffer(buffer, 0, &padded);
        }
    }

    /// Gets a buffer by name
    pub fn get_buffer(&self, buffer_name: &'static str) -> Option<&Buffer> {
        self.buffers.get(buffer_name).map(|(buffer, _)| buffer)
    }

    /// Gets a binding resource for the entire buffer
    pub fn get_entire_binding(&self, buffer_name: &'static str) -> Option<wgpu::BindingResource> {
        self.get_buffer(buffer_name)
            .map(|buffer| buffer.as_entire_binding())
    }

    /// Gets the total allocated memory across all buffers
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|buffer_analytics| buffer_analytics.allocated_memory)
            .sum()
    }
}
