//! # img2vid
//!
//! Two small tools for turning a folder of still images into a video.
//!
//! - `img2vid` collects the images in a folder, orders them by name, and asks
//!   ffmpeg to encode them at a fixed frame rate.
//! - `img2vid-bounce` makes a sequence play forward then backward by copying
//!   frames, in reverse, to new files that sort right after the end frame.
//!
//! ```text
//! img2vid-bounce   a b c d  →  a b c d d_001(c) d_002(b) d_003(a)
//! img2vid          sorted frames → concat list → ffmpeg → output.mp4
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Finds image files by extension and sorts them by name |
//! | [`range`] | Resolves a frame range from 1-based positions or file names |
//! | [`naming`] | Picks free `stem_NNN.ext` names after an anchor frame |
//! | [`bounce`] | Plans and performs the ping-pong copies |
//! | [`manifest`] | Writes the ffmpeg concat demuxer list |
//! | [`encode`] | Builds and runs the ffmpeg command |
//! | [`config`] | Layered settings: stock defaults, `img2vid.toml`, command line |
//! | [`output`] | User-facing lines and logging setup |
//!
//! # Ordering
//!
//! Both tools sort by lowercased file name and nothing else: no natural-number
//! ordering, no timestamps. `frame10.png` sorts before `frame2.png`. The bounce
//! copies rely on this, since `d_001.png` must land right after `d.png`.
//!
//! # Errors
//!
//! Each module has its own `thiserror` enum. The binaries print the error on
//! one line to stderr and map it to an exit status; see
//! [`encode::EncodeError::exit_code`].

pub mod bounce;
pub mod config;
pub mod encode;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod range;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
