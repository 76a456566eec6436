use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{error, info};
use ttf_parser::{Face, OutlineBuilder};

/// Closed 2D contours of one glyph, flattened to line segments and scaled
/// so one em equals one scene unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub contours: Vec<Vec<Vec2>>,
}

impl GlyphOutline {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

/// A font file held in memory, validated at load time.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    data: Vec<u8>,
}

impl LoadedFont {
    /// Parses the font bytes, failing early on anything ttf-parser
    /// rejects.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Face::parse(&data, 0).map_err(|err| anyhow!("unsupported font: {err}"))?;
        Ok(Self { data })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("unable to read font {}", path.display()))?;
        Self::from_bytes(data).with_context(|| format!("unable to parse {}", path.display()))
    }

    /// Extracts the outline of `glyph`, flattening each quadratic or cubic
    /// curve into `curve_segments` line segments.
    pub fn outline(&self, glyph: char, curve_segments: u32) -> Result<GlyphOutline> {
        let face = Face::parse(&self.data, 0).map_err(|err| anyhow!("unsupported font: {err}"))?;
        let glyph_id = face
            .glyph_index(glyph)
            .ok_or_else(|| anyhow!("font has no glyph for {glyph:?}"))?;

        let scale = 1.0 / face.units_per_em() as f32;
        let mut builder = FlatteningBuilder::new(scale, curve_segments.max(1));
        if face.outline_glyph(glyph_id, &mut builder).is_none() {
            return Err(anyhow!("glyph {glyph:?} has no outline"));
        }
        Ok(builder.finish())
    }
}

/// Status of the one-shot background font load.
#[derive(Debug)]
pub enum FontStatus<'a> {
    Pending,
    Ready(&'a LoadedFont),
    Failed,
}

enum Slot {
    Pending(Receiver<Result<LoadedFont>>),
    Ready(LoadedFont),
    Failed,
}

/// Handle to a font loading in the background.
///
/// The scene renders without glyph meshes until `poll` reports `Ready`;
/// a failed load is terminal and logged once, after which `poll` keeps
/// returning `Failed`.
pub struct FontHandle {
    path: PathBuf,
    slot: Slot,
}

impl FontHandle {
    /// Starts reading and parsing the font on a background thread.
    pub fn load(path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let _ = sender.send(LoadedFont::from_file(&worker_path));
        });
        Self {
            path,
            slot: Slot::Pending(receiver),
        }
    }

    /// Checks the load without blocking.
    pub fn poll(&mut self) -> FontStatus<'_> {
        let settled = if let Slot::Pending(receiver) = &self.slot {
            match receiver.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    Some(Err(anyhow!("font loader disappeared")))
                }
            }
        } else {
            None
        };
        if let Some(result) = settled {
            self.settle(result);
        }
        match &self.slot {
            Slot::Pending(_) => FontStatus::Pending,
            Slot::Ready(font) => FontStatus::Ready(font),
            Slot::Failed => FontStatus::Failed,
        }
    }

    /// Blocks until the load settles. Headless paths use this instead of
    /// per-frame polling.
    pub fn wait(&mut self) -> FontStatus<'_> {
        let settled = if let Slot::Pending(receiver) = &self.slot {
            Some(
                receiver
                    .recv()
                    .unwrap_or_else(|_| Err(anyhow!("font loader disappeared"))),
            )
        } else {
            None
        };
        if let Some(result) = settled {
            self.settle(result);
        }
        self.poll()
    }

    fn settle(&mut self, result: Result<LoadedFont>) {
        match result {
            Ok(font) => {
                info!("font {} loaded", self.path.display());
                self.slot = Slot::Ready(font);
            }
            Err(err) => {
                error!("font {} failed to load: {err:?}", self.path.display());
                self.slot = Slot::Failed;
            }
        }
    }
}

struct FlatteningBuilder {
    scale: f32,
    segments: u32,
    contours: Vec<Vec<Vec2>>,
    current: Vec<Vec2>,
    cursor: Vec2,
}

impl FlatteningBuilder {
    fn new(scale: f32, segments: u32) -> Self {
        Self {
            scale,
            segments,
            contours: Vec::new(),
            current: Vec::new(),
            cursor: Vec2::ZERO,
        }
    }

    fn point(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y) * self.scale
    }

    fn push(&mut self, point: Vec2) {
        // Collapse repeated points produced by tiny curves.
        if self
            .current
            .last()
            .is_some_and(|last| (*last - point).length_squared() < 1e-12)
        {
            return;
        }
        self.current.push(point);
        self.cursor = point;
    }

    fn finish(mut self) -> GlyphOutline {
        self.end_contour();
        GlyphOutline {
            contours: self.contours,
        }
    }

    fn end_contour(&mut self) {
        if self.current.len() >= 3 {
            let mut contour = std::mem::take(&mut self.current);
            // The implicit closing segment duplicates the start point.
            if contour
                .first()
                .zip(contour.last())
                .is_some_and(|(first, last)| (*first - *last).length_squared() < 1e-12)
            {
                contour.pop();
            }
            if contour.len() >= 3 {
                self.contours.push(contour);
            }
        } else {
            self.current.clear();
        }
    }
}

impl OutlineBuilder for FlatteningBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        let point = self.point(x, y);
        self.current.push(point);
        self.cursor = point;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.point(x, y);
        self.push(point);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let start = self.cursor;
        let control = self.point(x1, y1);
        let end = self.point(x, y);
        for step in 1..=self.segments {
            let t = step as f32 / self.segments as f32;
            let a = start.lerp(control, t);
            let b = control.lerp(end, t);
            self.push(a.lerp(b, t));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let start = self.cursor;
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let end = self.point(x, y);
        for step in 1..=self.segments {
            let t = step as f32 / self.segments as f32;
            let a = start.lerp(c1, t);
            let b = c1.lerp(c2, t);
            let c = c2.lerp(end, t);
            let ab = a.lerp(b, t);
            let bc = b.lerp(c, t);
            self.push(ab.lerp(bc, t));
        }
    }

    fn close(&mut self) {
        self.end_contour();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bogus_bytes_are_rejected() {
        assert!(LoadedFont::from_bytes(vec![0, 1, 2, 3]).is_err());
    }

    #[test]
    fn missing_file_fails_the_handle() {
        let mut handle = FontHandle::load(PathBuf::from("/does/not/exist.ttf"));
        assert!(matches!(handle.wait(), FontStatus::Failed));
        // Terminal state.
        assert!(matches!(handle.poll(), FontStatus::Failed));
    }

    #[test]
    fn quad_flattening_respects_segment_count() {
        let mut builder = FlatteningBuilder::new(1.0, 4);
        builder.move_to(0.0, 0.0);
        builder.quad_to(1.0, 2.0, 2.0, 0.0);
        builder.line_to(1.0, -1.0);
        builder.close();
        let outline = builder.finish();
        assert_eq!(outline.contours.len(), 1);
        // Start point + 4 curve samples + 1 line point.
        assert_eq!(outline.contours[0].len(), 6);
        // Curve midpoint of the quadratic is at (1, 1).
        let mid = outline.contours[0][2];
        assert!((mid - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn short_contours_are_dropped() {
        let mut builder = FlatteningBuilder::new(1.0, 4);
        builder.move_to(0.0, 0.0);
        builder.line_to(1.0, 0.0);
        builder.close();
        assert!(builder.finish().is_empty());
    }
}
