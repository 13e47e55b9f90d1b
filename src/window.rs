use serde::Serialize;
use tauri::{PhysicalPosition, PhysicalSize, Position, Size, WebviewWindow};

const MIN_WIDTH: u32 = 800;
const MIN_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Two thirds of the monitor (at least 800x600, at most the monitor), centered.
pub fn centered_geometry(monitor: PhysicalSize<u32>, origin: PhysicalPosition<i32>) -> WindowGeometry {
    let width = (monitor.width * 2 / 3).max(MIN_WIDTH).min(monitor.width);
    let height = (monitor.height * 2 / 3).max(MIN_HEIGHT).min(monitor.height);

    WindowGeometry {
        x: origin.x + ((monitor.width - width) / 2) as i32,
        y: origin.y + ((monitor.height - height) / 2) as i32,
        width,
        height,
    }
}

pub fn center_on_current_monitor(window: &WebviewWindow) -> Result<WindowGeometry, String> {
    let monitor = window
        .current_monitor()
        .map_err(|e| format!("Failed to query monitor: {e}"))?
        .ok_or_else(|| "No monitor information available".to_string())?;

    let geometry = centered_geometry(*monitor.size(), *monitor.position());

    window
        .set_size(Size::Physical(PhysicalSize {
            width: geometry.width,
            height: geometry.height,
        }))
        .map_err(|e| format!("Failed to resize window: {e}"))?;
    window
        .set_position(Position::Physical(PhysicalPosition {
            x: geometry.x,
            y: geometry.y,
        }))
        .map_err(|e| format!("Failed to move window: {e}"))?;

    log::info!(
        "Window placed at {}x{} @ ({}, {})",
        geometry.width,
        geometry.height,
        geometry.x,
        geometry.y
    );
    Ok(geometry)
}

#[tauri::command]
pub async fn setup_window_centered(window: WebviewWindow) -> Result<WindowGeometry, String> {
    center_on_current_monitor(&window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_two_thirds_and_centers() {
        let g = centered_geometry(PhysicalSize::new(2400, 1500), PhysicalPosition::new(0, 0));
        assert_eq!(g, WindowGeometry { x: 400, y: 250, width: 1600, height: 1000 });
    }

    #[test]
    fn respects_minimum_and_monitor_offset() {
        let g = centered_geometry(PhysicalSize::new(1024, 768), PhysicalPosition::new(1920, -100));
        assert_eq!(g.width, 800);
        assert_eq!(g.height, 600);
        assert_eq!(g.x, 1920 + 112);
        assert_eq!(g.y, -100 + 84);
    }

    #[test]
    fn never_exceeds_tiny_monitor() {
        let g = centered_geometry(PhysicalSize::new(640, 480), PhysicalPosition::new(0, 0));
        assert_eq!(g, WindowGeometry { x: 0, y: 0, width: 640, height: 480 });
    }
}
