use image::DynamicImage;
use iced::widget::image::Handle;

use crate::inspect::Inspector;

/// One titled image in the review window
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub handle: Handle,
}

impl Panel {
    pub fn new(title: impl Into<String>, image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            title: title.into(),
            handle: Handle::from_rgba(width, height, rgba.into_raw()),
        }
    }
}

/// Produces the panels for each display cycle
pub trait FrameSource: Clone + 'static {
    /// Panels for the next cycle, or `None` when done
    fn next_panels(&mut self) -> Option<Vec<Panel>>;
}

/// Walks the inspector's files, skipping ones that fail
#[derive(Clone)]
pub struct InspectorSource {
    inspector: Inspector,
    next: usize,
}

impl InspectorSource {
    pub fn new(inspector: Inspector) -> Self {
        Self { inspector, next: 0 }
    }
}

impl FrameSource for InspectorSource {
    fn next_panels(&mut self) -> Option<Vec<Panel>> {
        while self.next < self.inspector.files().len() {
            let index = self.next;
            self.next += 1;
            if let Some(frames) = self.inspector.try_inspect(index) {
                tracing::info!(
                    "{}: {} segment(s)",
                    frames.source.display(),
                    frames.lines.len()
                );
                let panels = frames
                    .panels()
                    .iter()
                    .map(|(title, image)| Panel::new(*title, image))
                    .collect();
                return Some(panels);
            }
        }
        None
    }
}

/// A single untitled image shown once
#[derive(Clone)]
pub struct SingleImageSource {
    image: Option<DynamicImage>,
}

impl SingleImageSource {
    pub fn new(image: DynamicImage) -> Self {
        Self { image: Some(image) }
    }
}

impl FrameSource for SingleImageSource {
    fn next_panels(&mut self) -> Option<Vec<Panel>> {
        self.image.take().map(|image| vec![Panel::new("", &image)])
    }
}
