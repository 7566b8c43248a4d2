use super::*;
use crate::error::{DashcamError, DisplayError};
use crate::frame::{FrameData, FrameFormat};
use std::time::SystemTime;

fn i420_solid(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
    let luma = (width * height) as usize;
    let mut data = vec![y; luma];
    data.extend(std::iter::repeat(u).take(luma / 4));
    data.extend(std::iter::repeat(v).take(luma / 4));
    data
}

#[test]
fn test_i420_to_rgb24_black_and_white() {
    let black = DisplayConverter::i420_to_rgb24(&i420_solid(4, 2, 16, 128, 128), 4, 2).unwrap();
    assert_eq!(black.len(), 4 * 2 * 3);
    assert!(black.iter().all(|&b| b == 0));

    let white = DisplayConverter::i420_to_rgb24(&i420_solid(4, 2, 235, 128, 128), 4, 2).unwrap();
    assert!(white.iter().all(|&b| b == 255));
}

#[test]
fn test_i420_to_rgb24_red_dominant() {
    // Y/U/V of pure red in BT.601 studio range
    let rgb = DisplayConverter::i420_to_rgb24(&i420_solid(2, 2, 81, 90, 240), 2, 2).unwrap();

    assert!(rgb[0] > 240);
    assert!(rgb[1] < 10);
    assert!(rgb[2] < 10);
}

#[test]
fn test_i420_to_rgb24_invalid_size() {
    let result = DisplayConverter::i420_to_rgb24(&[0u8; 5], 2, 2);
    assert!(result.is_err());
}

#[test]
fn test_i420_to_rgb24_rejects_odd_dimensions() {
    // 3x2 passes the size check (9 bytes) but has no whole chroma sample per column pair
    let result = DisplayConverter::i420_to_rgb24(&[128u8; 9], 3, 2);
    assert!(matches!(
        result,
        Err(DashcamError::Display(DisplayError::FormatConversion { .. }))
    ));

    assert!(DisplayConverter::i420_to_rgb24(&[128u8; 9], 2, 3).is_err());
}

#[test]
fn test_converter_trait() {
    let captured_at = SystemTime::now();
    let raw = FrameData::new(
        7,
        captured_at,
        i420_solid(320, 240, 128, 128, 128),
        320,
        240,
        FrameFormat::I420,
    );

    let rgb = I420Converter.convert(&raw).unwrap();

    assert_eq!(rgb.id, 7);
    assert_eq!(rgb.timestamp, captured_at);
    assert_eq!(rgb.format, FrameFormat::Rgb24);
    assert!(rgb.validate_size());

    let mut wrong = raw;
    wrong.format = FrameFormat::Rgb24;
    assert!(I420Converter.convert(&wrong).is_err());
}

#[test]
fn test_rgb24_to_rgb565_conversion() {
    let rgb24_data = vec![
        255, 0, 0, // Red
        0, 255, 0, // Green
        0, 0, 255, // Blue
    ];

    let rgb565_data = DisplayConverter::rgb24_to_rgb565(&rgb24_data, 3, 1).unwrap();

    assert_eq!(rgb565_data.len(), 6);

    let red_pixel = ((rgb565_data[1] as u16) << 8) | (rgb565_data[0] as u16);
    assert_eq!(red_pixel, 0xF800);
    let green_pixel = ((rgb565_data[3] as u16) << 8) | (rgb565_data[2] as u16);
    assert_eq!(green_pixel, 0x07E0);
    let blue_pixel = ((rgb565_data[5] as u16) << 8) | (rgb565_data[4] as u16);
    assert_eq!(blue_pixel, 0x001F);
}

#[test]
fn test_rgb24_to_rgb565_invalid_size() {
    let invalid_data = vec![255, 0];
    let result = DisplayConverter::rgb24_to_rgb565(&invalid_data, 1, 1);
    assert!(result.is_err());
}

#[test]
fn test_center_offset() {
    assert_eq!(DisplayConverter::center_offset((320, 240), (320, 240)), (0, 0));
    assert_eq!(DisplayConverter::center_offset((320, 240), (160, 120)), (80, 60));
    assert_eq!(DisplayConverter::center_offset((320, 240), (640, 480)), (-160, -120));
}

#[test]
fn test_canvas_blit_clips() {
    let mut canvas = Canvas::new(4, 4);
    let white = vec![255u8; 3 * 3 * 3];

    canvas.blit_rgb(&white, 3, 3, 2, -1);

    assert_eq!(canvas.pixel(1, 0), Some(Color::BLACK));
    assert_eq!(canvas.pixel(2, 0), Some(Color(255, 255, 255)));
    assert_eq!(canvas.pixel(3, 1), Some(Color(255, 255, 255)));
    assert_eq!(canvas.pixel(3, 2), Some(Color::BLACK));
    assert_eq!(canvas.pixel(4, 0), None);

    // Entirely off-canvas blits are ignored
    canvas.blit_rgb(&white, 3, 3, 10, 10);
}

#[test]
fn test_canvas_icon_alpha_blend() {
    let mut canvas = Canvas::new(2, 1);
    canvas.fill(Color::BLACK);

    let icon = Icon::new(
        "dot",
        2,
        1,
        vec![
            255, 255, 255, 255, // opaque white
            255, 255, 255, 0, // transparent
        ],
    );
    canvas.blit_icon(&icon, 0, 0);

    assert_eq!(canvas.pixel(0, 0), Some(Color(255, 255, 255)));
    assert_eq!(canvas.pixel(1, 0), Some(Color::BLACK));
}

#[test]
fn test_memory_surface_records_operations() {
    let mut surface = MemorySurface::new(8, 8);
    let state = surface.state();

    surface.fill(Color::RED);
    surface.blit_icon(&Icon::new("go", 1, 1, vec![0, 0, 0, 255]), 0, 0);
    surface.present().unwrap();

    let state = state.lock();
    assert_eq!(state.presents, 1);
    assert_eq!(state.fills, vec![Color::RED]);
    assert_eq!(state.icon_blits, vec!["go".to_string()]);
    let presented = state.last_presented.as_ref().unwrap();
    assert_eq!(presented.pixel(0, 0), Some(Color::BLACK));
    assert_eq!(presented.pixel(7, 7), Some(Color::RED));
}

#[test]
fn test_framebuffer_surface_writes_rgb565() {
    let dir = tempfile::tempdir().unwrap();
    let fb_path = dir.path().join("fb1");
    std::fs::write(&fb_path, b"").unwrap();

    let mut surface = FramebufferSurface::open(fb_path.to_str().unwrap(), (4, 2)).unwrap();
    assert_eq!(surface.size(), (4, 2));

    surface.fill(Color::RED);
    surface.present().unwrap();
    surface.present().unwrap();

    let written = std::fs::read(&fb_path).unwrap();
    assert_eq!(written.len(), 4 * 2 * 2);
    assert_eq!(&written[0..2], &[0x00, 0xF8]);
}

#[test]
fn test_framebuffer_surface_missing_device() {
    let result = FramebufferSurface::open("/nonexistent/fb9", (320, 240));
    assert!(result.is_err());
}

#[test]
fn test_icon_set_loads_pngs() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 255]))
        .save(dir.path().join("go.png"))
        .unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]))
        .save(dir.path().join("shutdown.png"))
        .unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not an icon").unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

    let icons = IconSet::load_dir(dir.path());

    assert_eq!(icons.len(), 2);
    let go = icons.get("go").unwrap();
    assert_eq!((go.width, go.height), (6, 4));
    assert_eq!(&go.rgba[0..4], &[10, 20, 30, 255]);
    assert!(icons.get("shutdown").is_some());
    assert!(icons.get("broken").is_none());
}

#[test]
fn test_icon_set_missing_directory() {
    let icons = IconSet::load_dir("/nonexistent/icons");
    assert!(icons.is_empty());
}

#[test]
fn test_display_stats() {
    let mut stats = DisplayStats::default();
    assert!(stats.last_frame_time.is_none());

    stats.record_frame_render();
    stats.record_frame_render();
    stats.record_frame_render();
    stats.record_render_error();
    stats.record_blank_frame();

    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(stats.render_errors, 1);
    assert_eq!(stats.blank_frames, 1);
    assert!(stats.last_frame_time.is_some());
}
