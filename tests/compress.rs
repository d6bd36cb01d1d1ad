//! Integration tests against a real wgpu device.
//!
//! Every test acquires an adapter and passes trivially when the machine has
//! none, so the suite stays runnable on headless CI.

use gpu_astc::{
    BlockSize, CompressorConfig, CompressorSettings, TextureCompressor, PREVIEW_FORMAT,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn create_device(extra: wgpu::Features) -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
    if !adapter.features().contains(extra) {
        return None;
    }
    pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("gpu-astc tests"),
            required_features: extra,
            required_limits: wgpu::Limits::downlevel_defaults(),
        },
        None,
    ))
    .ok()
}

fn encode_stub(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("encode stub"),
        source: wgpu::ShaderSource::Wgsl(include_str!("encode_stub.wgsl").into()),
    })
}

fn source_texture(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test source"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &gradient(width, height),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    texture
}

fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 251 % 256) as u8);
            data.push((y * 239 % 256) as u8);
            data.push(((x + y) % 256) as u8);
            data.push(255);
        }
    }
    data
}

#[test]
fn end_to_end_preview_decode_scenario() {
    init_logger();
    let Some((device, queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    // A device created without the ASTC feature cannot sample the compressed
    // format, so the capability probe must select the preview path.
    let settings = CompressorSettings::for_device(&device);
    assert!(settings.decompress_preview);

    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(settings);
    compressor
        .initialize(
            &device,
            &shader,
            CompressorConfig::new(256, 256, BlockSize::Astc4x4),
        )
        .unwrap();
    assert_eq!(compressor.intermediate_size(), Some((64, 64)));

    let output = compressor
        .create_output_texture(&device, 1, 1, false, PREVIEW_FORMAT)
        .unwrap();
    // Preview mode publishes full-resolution texels in the fallback format.
    assert_eq!(output.texture.width(), 256);
    assert_eq!(output.texture.height(), 256);
    assert_eq!(output.texture.format(), PREVIEW_FORMAT);

    let source = source_texture(&device, &queue, 256, 256);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("test encode"),
    });
    compressor.compress(&device, &mut encoder, &source, 0, &output.texture, 0, 0, false);
    queue.submit([encoder.finish()]);
    device.poll(wgpu::Maintain::Wait);
}

#[test]
fn compressed_path_writes_astc_destination() {
    init_logger();
    let Some((device, queue)) = create_device(wgpu::Features::TEXTURE_COMPRESSION_ASTC) else {
        eprintln!("skipping: no adapter with ASTC support");
        return;
    };

    let settings = CompressorSettings::for_device(&device);
    assert!(!settings.decompress_preview);

    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(settings);
    compressor
        .initialize(
            &device,
            &shader,
            CompressorConfig::new(256, 256, BlockSize::Astc4x4),
        )
        .unwrap();

    let output = compressor
        .create_output_texture(&device, 1, 1, false, wgpu::TextureFormat::Rgba8Unorm)
        .unwrap();
    assert_eq!(
        output.texture.format(),
        BlockSize::Astc4x4.texture_format(false)
    );

    let source = source_texture(&device, &queue, 256, 256);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("test encode"),
    });
    compressor.compress(&device, &mut encoder, &source, 0, &output.texture, 0, 0, false);
    queue.submit([encoder.finish()]);
    device.poll(wgpu::Maintain::Wait);
}

#[test]
fn disabled_compression_is_a_bit_exact_copy() {
    init_logger();
    let Some((device, queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    let settings = CompressorSettings {
        enable_compression: false,
        decompress_preview: false,
        linear_color_space: true,
    };
    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(settings);
    compressor
        .initialize(
            &device,
            &shader,
            CompressorConfig::new(64, 64, BlockSize::Astc4x4),
        )
        .unwrap();

    let data = gradient(64, 64);
    let source = source_texture(&device, &queue, 64, 64);
    // Destination with COPY_SRC so the result can be read back.
    let dest = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test dest"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("test readback"),
        size: 64 * 64 * 4,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("test copy"),
    });
    compressor.compress(&device, &mut encoder, &source, 0, &dest, 0, 0, true);
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &dest,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &readback,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(64 * 4),
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
    );
    queue.submit([encoder.finish()]);

    let slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap().unwrap();
    assert_eq!(&slice.get_mapped_range()[..], &data[..]);
}

#[test]
fn initialize_is_idempotent_until_config_changes() {
    init_logger();
    let Some((device, _queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    let settings = CompressorSettings {
        decompress_preview: false,
        ..Default::default()
    };
    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(settings);

    // 240 divides evenly by every supported block edge.
    let config = CompressorConfig::new(240, 240, BlockSize::Astc4x4);
    compressor.initialize(&device, &shader, config).unwrap();
    let first = compressor.intermediate_texture().unwrap().global_id();

    compressor.initialize(&device, &shader, config).unwrap();
    assert_eq!(
        compressor.intermediate_texture().unwrap().global_id(),
        first,
        "unchanged config must not reallocate"
    );

    compressor
        .initialize(
            &device,
            &shader,
            CompressorConfig::new(240, 240, BlockSize::Astc5x5),
        )
        .unwrap();
    assert_ne!(compressor.intermediate_texture().unwrap().global_id(), first);
    assert_eq!(compressor.intermediate_size(), Some((48, 48)));
}

#[test]
fn quant_tables_upload_for_6x6() {
    init_logger();
    let Some((device, _queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    let settings = CompressorSettings {
        decompress_preview: false,
        ..Default::default()
    };
    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(settings);
    compressor
        .initialize(
            &device,
            &shader,
            CompressorConfig::new(240, 240, BlockSize::Astc6x6),
        )
        .unwrap();
    assert_eq!(compressor.intermediate_size(), Some((40, 40)));
}

#[test]
fn teardown_is_idempotent_and_reinitializable() {
    init_logger();
    let Some((device, _queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(CompressorSettings {
        decompress_preview: false,
        ..Default::default()
    });
    let config = CompressorConfig::new(64, 64, BlockSize::Astc4x4);
    compressor.initialize(&device, &shader, config).unwrap();
    compressor.teardown();
    compressor.teardown();
    assert!(compressor.config().is_none());
    compressor.initialize(&device, &shader, config).unwrap();
    assert_eq!(compressor.intermediate_size(), Some((16, 16)));
}

#[test]
fn misaligned_initialize_fails_before_allocation() {
    init_logger();
    let Some((device, _queue)) = create_device(wgpu::Features::empty()) else {
        eprintln!("skipping: no wgpu adapter");
        return;
    };

    let shader = encode_stub(&device);
    let mut compressor = TextureCompressor::new(CompressorSettings::default());
    let result = compressor.initialize(
        &device,
        &shader,
        CompressorConfig::new(250, 256, BlockSize::Astc4x4),
    );
    assert!(result.is_err());
    assert!(compressor.config().is_none());
}
