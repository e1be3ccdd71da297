//! Photograph loading for the image element.
//!
//! Rig photographs are full-size camera frames, so decoding happens on a worker
//! thread. The panel shows a placeholder until the decoded image comes back over
//! a channel, then uploads it as an egui texture.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use egui::{ColorImage, Context, TextureHandle, TextureOptions};

/// Decodes an image file into RGBA8.
pub fn load_rgba(path: &Path) -> Result<image::RgbaImage, image::ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

/// What the image element can show for a photograph right now.
pub enum Photo<'a> {
    /// Still decoding.
    Loading,
    /// Decoded and uploaded.
    Ready(&'a TextureHandle),
    /// The file could not be read or decoded.
    Unavailable,
}

enum Entry {
    Decoding(Receiver<Result<image::RgbaImage, image::ImageError>>),
    Ready(TextureHandle),
    Failed,
}

/// Keeps the texture of the photograph currently shown.
///
/// Only one photograph is visible at a time, so the cache holds a single entry and
/// starts a new decode when the source path changes. A decode that is no longer
/// wanted is abandoned: its worker finds the channel closed and exits. Failures
/// are remembered per path so the error is logged once.
#[derive(Default)]
pub struct PhotoCache {
    current: Option<(PathBuf, Entry)>,
}

impl PhotoCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the photograph at `path`, starting a background decode on first use.
    pub fn texture(&mut self, ctx: &Context, path: &Path) -> Photo<'_> {
        let cached = self
            .current
            .as_ref()
            .is_some_and(|(current, _)| current == path);
        if !cached {
            self.current = Some((path.to_path_buf(), spawn_decode(ctx, path)));
            return Photo::Loading;
        }
        let Some((path, entry)) = &mut self.current else {
            return Photo::Unavailable;
        };

        if let Entry::Decoding(receiver) = entry {
            let decoded = match receiver.try_recv() {
                Ok(decoded) => decoded,
                Err(TryRecvError::Empty) => return Photo::Loading,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("photograph decoder for {} stopped", path.display());
                    *entry = Entry::Failed;
                    return Photo::Unavailable;
                }
            };
            *entry = match decoded {
                Ok(rgba) => {
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                    log::debug!("loaded photograph {}", path.display());
                    Entry::Ready(ctx.load_texture(
                        path.to_string_lossy(),
                        color_image,
                        TextureOptions::LINEAR,
                    ))
                }
                Err(err) => {
                    log::warn!("failed to load photograph {}: {err}", path.display());
                    Entry::Failed
                }
            };
        }

        match entry {
            Entry::Decoding(_) => Photo::Loading,
            Entry::Ready(handle) => Photo::Ready(handle),
            Entry::Failed => Photo::Unavailable,
        }
    }

    /// Drops the cached texture and abandons any decode in flight.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

fn spawn_decode(ctx: &Context, path: &Path) -> Entry {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let ctx = ctx.clone();
    let path = path.to_path_buf();
    thread::spawn(move || {
        let decoded = load_rgba(&path);
        if sender.send(decoded).is_ok() {
            ctx.request_repaint();
        }
    });
    Entry::Decoding(receiver)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    /// Polls the cache the way the panel does every frame, until the decode settles.
    fn settle(cache: &mut PhotoCache, ctx: &Context, path: &Path) -> Option<egui::TextureId> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match cache.texture(ctx, path) {
                Photo::Ready(handle) => return Some(handle.id()),
                Photo::Unavailable => return None,
                Photo::Loading => {
                    assert!(Instant::now() < deadline, "photograph never finished decoding");
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }

    #[test]
    fn test_load_rgba_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led_0001.png");
        let mut img = image::RgbaImage::new(4, 2);
        img.put_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let loaded = load_rgba(&path).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.get_pixel(1, 1), &image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_rgba(&dir.path().join("missing.jpg")).is_err());
    }

    #[test]
    fn test_first_request_is_loading() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbaImage::new(2, 2).save(&path).unwrap();

        let mut cache = PhotoCache::new();
        // The first frame only starts the decode.
        assert!(matches!(cache.texture(&ctx, &path), Photo::Loading));
        assert!(settle(&mut cache, &ctx, &path).is_some());
    }

    #[test]
    fn test_cache_loads_once_and_remembers_failures() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbaImage::new(2, 2).save(&path).unwrap();

        let mut cache = PhotoCache::new();
        let first = settle(&mut cache, &ctx, &path);
        assert!(first.is_some());
        assert_eq!(settle(&mut cache, &ctx, &path), first);

        let missing = dir.path().join("missing.png");
        assert!(settle(&mut cache, &ctx, &missing).is_none());
        assert!(matches!(cache.texture(&ctx, &missing), Photo::Unavailable));
    }

    #[test]
    fn test_switching_path_abandons_pending_decode() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        image::RgbaImage::new(2, 2).save(&first).unwrap();
        image::RgbaImage::new(3, 1).save(&second).unwrap();

        let mut cache = PhotoCache::new();
        let _ = cache.texture(&ctx, &first);
        let id = settle(&mut cache, &ctx, &second).unwrap();
        let Photo::Ready(handle) = cache.texture(&ctx, &second) else {
            panic!("second photograph should stay ready");
        };
        assert_eq!(handle.id(), id);
        assert_eq!(handle.size(), [3, 1]);

        cache.clear();
        assert!(matches!(cache.texture(&ctx, &second), Photo::Loading));
    }
}
