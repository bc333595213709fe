use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, info};

use crate::animation::{Animation, Figure};
use crate::error::{Error, Result};
use crate::raster::rasterize;
use crate::text;

pub trait VideoOutput {
    fn write(&mut self, frame: RgbaImage) -> Result<()>;
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Where an animation goes: a video file when `path` is set, a window
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    pub figure: Figure,
}

mod gif_file {
    use super::VideoOutput;
    use crate::error::Result;

    use std::{
        fs::File,
        io::{BufWriter, Write},
        path::Path,
    };

    use gif::{Encoder, Frame, Repeat};
    use image::RgbaImage;

    /// Quantizer speed, 1 is best quality and 30 fastest.
    const SPEED: i32 = 10;

    pub struct GifOutput {
        encoder: Encoder<BufWriter<File>>,
        width: u16,
        height: u16,
        fps: u32,
        frames: u64,
    }

    /// Delay of frame `index` in hundredths of a second. Whole centiseconds
    /// can't express most rates, so delays alternate to keep the running
    /// total at `index / fps` seconds (3, 4, 3, ... at 30 fps).
    pub fn delay(index: u64, fps: u32) -> u16 {
        let fps = u64::from(fps.max(1));
        let elapsed = |frames: u64| (frames * 200 + fps) / (2 * fps);
        (elapsed(index + 1) - elapsed(index)).max(1) as u16
    }

    impl GifOutput {
        pub fn try_open(
            path: &Path,
            width: u32,
            height: u32,
            fps: u32,
        ) -> Result<Box<dyn VideoOutput>> {
            let file = BufWriter::new(File::create(path)?);
            let (width, height) = (width as u16, height as u16);
            let mut encoder = Encoder::new(file, width, height, &[])?;
            encoder.set_repeat(Repeat::Infinite)?;
            Ok(Box::new(GifOutput {
                encoder,
                width,
                height,
                fps,
                frames: 0,
            }))
        }
    }

    impl VideoOutput for GifOutput {
        fn write(&mut self, frame: RgbaImage) -> Result<()> {
            let mut pixels = frame.into_raw();
            let mut frame = Frame::from_rgba_speed(self.width, self.height, &mut pixels, SPEED);
            frame.delay = delay(self.frames, self.fps);
            self.encoder.write_frame(&frame)?;
            self.frames += 1;
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<()> {
            let mut file = self.encoder.into_inner()?;
            file.flush()?;
            Ok(())
        }
    }
}

mod ffmpeg {
    use super::VideoOutput;
    use crate::error::{Error, Result};

    use std::{
        io::{self, Write},
        path::Path,
        process::{Child, ChildStdin, Command, Stdio},
    };

    use image::RgbaImage;
    use log::{debug, error};

    pub struct FfmpegOutput {
        child: Child,
        stdin: Option<ChildStdin>,
    }

    impl FfmpegOutput {
        pub fn try_open(
            path: &Path,
            width: u32,
            height: u32,
            fps: u32,
        ) -> Result<Box<dyn VideoOutput>> {
            let mut command = Command::new("ffmpeg");
            command
                .args(["-loglevel", "error", "-y", "-f", "rawvideo", "-pix_fmt", "rgba"])
                .args(["-s", &format!("{width}x{height}")])
                .args(["-r", &fps.to_string()])
                .args(["-i", "-", "-pix_fmt", "yuv420p"])
                .arg(path);
            Ok(Box::new(Self::spawn(command)?))
        }

        /// Start an encoder that reads raw frames from its stdin.
        pub fn spawn(mut command: Command) -> Result<Self> {
            command.stdin(Stdio::piped());
            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    return Err(Error::config(
                        "ffmpeg was not found on PATH, install it or write a .gif file instead",
                    ));
                }
                Err(err) => return Err(err.into()),
            };
            let stdin = child.stdin.take();
            Ok(FfmpegOutput { child, stdin })
        }

        /// Reap the encoder and describe how it ended.
        fn exit_error(&mut self) -> Error {
            drop(self.stdin.take());
            match self.child.wait() {
                Ok(status) => {
                    error!("ffmpeg exited with {status}");
                    io::Error::other(format!("ffmpeg exited with {status}")).into()
                }
                Err(err) => err.into(),
            }
        }
    }

    impl VideoOutput for FfmpegOutput {
        fn write(&mut self, frame: RgbaImage) -> Result<()> {
            let Some(stdin) = self.stdin.as_mut() else {
                let closed = io::Error::new(io::ErrorKind::BrokenPipe, "ffmpeg stdin closed");
                return Err(closed.into());
            };
            match stdin.write_all(frame.as_raw()) {
                Ok(()) => Ok(()),
                // The encoder quit early, its exit status says more than EPIPE.
                Err(err) => {
                    debug!("writing to ffmpeg failed: {err}");
                    Err(self.exit_error())
                }
            }
        }

        fn finish(mut self: Box<Self>) -> Result<()> {
            // Closing stdin tells ffmpeg the stream is over.
            drop(self.stdin.take());
            let status = self.child.wait()?;
            if !status.success() {
                error!("ffmpeg exited with {status}");
                return Err(io::Error::other(format!("ffmpeg exited with {status}")).into());
            }
            Ok(())
        }
    }
}

/// Open a video file, picking the encoder from the file extension.
pub fn try_open(path: &Path, width: u32, height: u32, fps: u32) -> Result<Box<dyn VideoOutput>> {
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if is_gif {
        gif_file::GifOutput::try_open(path, width, height, fps)
    } else {
        ffmpeg::FfmpegOutput::try_open(path, width, height, fps)
    }
}

/// Render every frame of `animation` once into `path`.
pub fn record(animation: &mut dyn Animation, path: &Path, figure: Figure) -> Result<()> {
    let (width, height) = figure.pixels();
    let max = u16::MAX as u32;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(Error::config(format!(
            "unsupported video size {width}x{height}, check the dpi"
        )));
    }
    let n_frames = animation.frame_count();
    info!(
        "writing {n_frames} frames of \"{}\" to {} ({width}x{height} @ {} fps)",
        animation.title(),
        path.display(),
        Figure::FPS
    );
    let font = text::font()?;
    let dpi = figure.dpi as f32;
    let mut output = try_open(path, width, height, Figure::FPS)?;
    for frame in 0..n_frames {
        animation.tick(frame);
        output.write(rasterize(&animation.scene(), width, height, dpi, &font))?;
        if frame % 100 == 0 {
            debug!("frame {frame}/{n_frames}");
        }
    }
    output.finish()?;
    info!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::{Aspect, Bounds, Color, Primitive, Scene};
    use std::time::Duration;

    struct Blink {
        frame: usize,
    }

    impl Animation for Blink {
        fn title(&self) -> &str {
            "blink"
        }

        fn frame_count(&self) -> usize {
            3
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        fn tick(&mut self, frame: usize) {
            self.frame = frame;
        }

        fn scene(&self) -> Scene {
            let mut scene = Scene::new(Bounds::new(0.0, 3.0, 0.0, 1.0), Aspect::Fill);
            scene.push(Primitive::Marker {
                center: (self.frame as f64 + 0.5, 0.5),
                radius: 2.0,
                color: Color::BLACK,
            });
            scene
        }
    }

    #[test]
    fn records_a_gif() {
        let path = std::env::temp_dir().join(format!("physviz-test-{}.gif", std::process::id()));
        let figure = Figure {
            size: (0.3, 0.1),
            dpi: 100,
        };
        let mut blink = Blink { frame: 0 };
        record(&mut blink, &path, figure).unwrap();
        assert_eq!(blink.frame, 2);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3b));

        let mut decoder = gif::DecodeOptions::new().read_info(bytes.as_slice()).unwrap();
        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
        }
        assert_eq!(delays, [3, 4, 3]);
    }

    #[test]
    fn gif_delays_average_to_the_frame_rate() {
        let delays: Vec<u16> = (0..6).map(|i| gif_file::delay(i, 30)).collect();
        assert_eq!(delays, [3, 4, 3, 3, 4, 3]);
        let second: u32 = (0..30).map(|i| u32::from(gif_file::delay(i, 30))).sum();
        assert_eq!(second, 100);
        assert!((0..50).all(|i| gif_file::delay(i, 25) == 4));
        assert_eq!(gif_file::delay(0, 0), 100);
    }

    #[cfg(unix)]
    #[test]
    fn dead_encoder_reports_its_exit_status() {
        let mut command = std::process::Command::new("sh");
        command.args(["-c", "exit 3"]);
        let mut output = ffmpeg::FfmpegOutput::spawn(command).unwrap();
        // Larger than a pipe buffer, so the write outlives the child.
        let frame = RgbaImage::new(512, 512);
        let err = output.write(frame).unwrap_err();
        assert!(err.to_string().contains("exit status: 3"), "{err}");
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let figure = Figure {
            size: (10.0, 6.0),
            dpi: 0,
        };
        let path = std::env::temp_dir().join("physviz-never-written.gif");
        let err = record(&mut Blink { frame: 0 }, &path, figure).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!path.exists());
    }
}
