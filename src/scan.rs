//! Public pixel readout, for writing the resized image back out.
//! Walks the currently visible image row-major via `cursor`, yielding
//! public-orientation coordinates (`transposed` swaps `x`/`y` back).
//!
//! `scan`/`scan_line` mirror the library's 8-bit-only fast path;
//! `scan_ext`/`scan_line_ext` work at any `ColDepth` but return
//! normalized `f64` samples rather than raw bytes, since a `PixelBuffer`
//! is not always byte-backed.

use crate::carver::Carver;
use crate::cursor::Cursor;
use crate::pixel::PixelBuffer;
use crate::types::ColDepth;

impl Carver {
    pub(crate) fn reset_cursor(&mut self) {
        self.cursor = Cursor::new(self.w, self.h);
        for aux in &mut self.attached {
            aux.reset_cursor();
        }
    }

    /// Rewind the scan cursor to the start of the image. Recurses into
    /// any attached carvers.
    pub fn scan_reset(&mut self) {
        self.reset_cursor();
    }

    /// Advance one pixel and return its public-orientation coordinate
    /// plus its raw channel bytes. `None` once every pixel has been
    /// visited, or if the buffer is not 8-bit.
    pub fn scan(&mut self) -> Option<(u32, u32, &[u8])> {
        if self.col_depth != ColDepth::U8 {
            return None;
        }
        if self.cursor.done() {
            return None;
        }
        let (cx, cy) = self.cursor.pos();
        let p = self.cursor.physical(&self.raw) as usize;
        self.cursor.advance();
        let (x, y) = if self.transposed { (cy, cx) } else { (cx, cy) };
        let channels = self.channels as usize;
        match &self.rgb {
            PixelBuffer::U8(v) => Some((x, y, &v[p * channels..p * channels + channels])),
            _ => None,
        }
    }

    /// Like [`Carver::scan`] but works at any [`ColDepth`], returning
    /// normalized `[0, 1]` samples.
    pub fn scan_ext(&mut self) -> Option<(u32, u32, Vec<f64>)> {
        if self.cursor.done() {
            return None;
        }
        let (cx, cy) = self.cursor.pos();
        let p = self.cursor.physical(&self.raw) as usize;
        self.cursor.advance();
        let (x, y) = if self.transposed { (cy, cx) } else { (cx, cy) };
        let channels = self.channels as usize;
        let mut out = Vec::with_capacity(channels);
        for ch in 0..channels {
            out.push(self.rgb.get_norm(p * channels + ch));
        }
        Some((x, y, out))
    }

    /// Read out the whole current row as raw 8-bit samples, then skip
    /// the cursor to the next row. `None` once exhausted, if the
    /// buffer is not 8-bit, or if the carver is currently transposed
    /// (rows are only meaningful in the untransposed orientation).
    pub fn scan_line(&mut self) -> Option<Vec<u8>> {
        if self.col_depth != ColDepth::U8 || self.transposed {
            return None;
        }
        if self.cursor.done() {
            return None;
        }
        let y = self.cursor.row();
        self.cursor.goto_row(y);
        let channels = self.channels as usize;
        let v = match &self.rgb {
            PixelBuffer::U8(v) => v,
            _ => return None,
        };
        let mut out = Vec::with_capacity(self.w as usize * channels);
        for x in 0..self.w as usize {
            let p = self.raw[y as usize][x] as usize;
            out.extend_from_slice(&v[p * channels..p * channels + channels]);
        }
        self.cursor.advance_row();
        Some(out)
    }

    /// Like [`Carver::scan_line`] but works at any [`ColDepth`],
    /// returning normalized `[0, 1]` samples.
    pub fn scan_line_ext(&mut self) -> Option<Vec<f64>> {
        if self.transposed {
            return None;
        }
        if self.cursor.done() {
            return None;
        }
        let y = self.cursor.row();
        self.cursor.goto_row(y);
        let channels = self.channels as usize;
        let mut out = Vec::with_capacity(self.w as usize * channels);
        for x in 0..self.w as usize {
            let p = self.raw[y as usize][x] as usize;
            for ch in 0..channels {
                out.push(self.rgb.get_norm(p * channels + ch));
            }
        }
        self.cursor.advance_row();
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;

    #[test]
    fn scan_visits_every_pixel_once_in_public_order() {
        let data: Vec<u8> = (0..12).collect();
        let buf = PixelBuffer::U8(data);
        let mut c = Carver::new(buf, 4, 3, 1).unwrap();
        c.init(1, 0.0).unwrap();
        let mut seen = Vec::new();
        while let Some((x, y, bytes)) = c.scan() {
            seen.push((x, y, bytes[0]));
        }
        assert_eq!(seen.len(), 12);
        assert_eq!(seen[0], (0, 0, 0));
        assert_eq!(seen[11], (3, 2, 11));
    }

    #[test]
    fn scan_line_reads_whole_rows() {
        let data: Vec<u8> = (0..12).collect();
        let buf = PixelBuffer::U8(data);
        let mut c = Carver::new(buf, 4, 3, 1).unwrap();
        c.init(1, 0.0).unwrap();
        let row0 = c.scan_line().unwrap();
        assert_eq!(row0, vec![0, 1, 2, 3]);
        let row1 = c.scan_line().unwrap();
        assert_eq!(row1, vec![4, 5, 6, 7]);
    }

    #[test]
    fn scan_line_refuses_when_transposed() {
        let buf = PixelBuffer::U8(vec![0; 12]);
        let mut c = Carver::new(buf, 4, 3, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.transpose().unwrap();
        assert!(c.scan_line().is_none());
    }

    #[test]
    fn scan_reset_rewinds() {
        let buf = PixelBuffer::U8(vec![0; 4]);
        let mut c = Carver::new(buf, 2, 2, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.scan();
        c.scan();
        c.scan_reset();
        assert!(c.scan().is_some());
    }
}
