use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine::{AudioHost, AudioOutput, PcmBuffer};

type SampleQueue = Arc<Mutex<VecDeque<f32>>>;

enum StreamCommand {
    Play,
    Pause,
}

/// A command plus the channel the output thread answers it on.
type Request = (StreamCommand, mpsc::SyncSender<Result<()>>);

/// Play/pause for the stream the output thread owns.
trait StreamControl {
    fn start(&self) -> Result<()>;
    fn halt(&self) -> Result<()>;
}

impl StreamControl for cpal::Stream {
    fn start(&self) -> Result<()> {
        StreamTrait::play(self).map_err(anyhow::Error::from)
    }

    fn halt(&self) -> Result<()> {
        StreamTrait::pause(self).map_err(anyhow::Error::from)
    }
}

/// Opens the default cpal output device.
pub struct CpalAudioHost;

impl AudioHost for CpalAudioHost {
    fn create_output(&self, sample_rate: u32) -> Result<Box<dyn AudioOutput>> {
        Ok(Box::new(CpalOutput::open(sample_rate)?))
    }
}

/// Output context backed by a cpal stream.
///
/// The stream itself lives on a dedicated thread (cpal streams are not `Send`
/// on every platform); this handle only shares the sample queue with the
/// device callback and sends play/pause requests over a channel, waiting for
/// the thread's answer. Dropping the handle closes the channel, which ends
/// the thread and the stream.
pub struct CpalOutput {
    queue: SampleQueue,
    requests: Mutex<mpsc::Sender<Request>>,
    suspended: AtomicBool,
    device_rate: u32,
    device_channels: u16,
}

impl CpalOutput {
    pub fn open(context_rate: u32) -> Result<Self> {
        Self::spawn(context_rate, build_stream)
    }

    fn spawn<S, F>(context_rate: u32, build: F) -> Result<Self>
    where
        S: StreamControl + 'static,
        F: FnOnce(SampleQueue) -> Result<(S, u32, u16)> + Send + 'static,
    {
        let queue: SampleQueue = Arc::new(Mutex::new(VecDeque::new()));
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(u32, u16)>>(1);

        let thread_queue = Arc::clone(&queue);
        std::thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || {
                let stream = match build(thread_queue) {
                    Ok((stream, rate, channels)) => {
                        let _ = ready_tx.send(Ok((rate, channels)));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for (cmd, reply) in req_rx {
                    let result = match cmd {
                        StreamCommand::Play => stream.start(),
                        StreamCommand::Pause => stream.halt(),
                    };
                    if let Err(e) = &result {
                        tracing::error!("Audio stream control failed: {:#}", e);
                    }
                    let _ = reply.send(result);
                }

                tracing::debug!("Audio output thread exiting");
            })
            .context("Failed to spawn audio output thread")?;

        let (device_rate, device_channels) = ready_rx
            .recv()
            .context("Audio output thread exited during setup")??;

        tracing::info!(
            "Audio output ready: context {}Hz, device {}Hz x {} channel(s)",
            context_rate,
            device_rate,
            device_channels
        );

        Ok(Self {
            queue,
            requests: Mutex::new(req_tx),
            suspended: AtomicBool::new(true),
            device_rate,
            device_channels,
        })
    }

    /// Sends `cmd` to the output thread and waits for the stream's result.
    fn control(&self, cmd: StreamCommand) -> Result<()> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.requests
            .lock()
            .unwrap()
            .send((cmd, reply_tx))
            .map_err(|_| anyhow::anyhow!("Audio output thread is gone"))?;
        reply_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("Audio output thread is gone"))?
    }
}

impl AudioOutput for CpalOutput {
    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    fn resume(&self) -> Result<()> {
        if self.suspended.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.control(StreamCommand::Play) {
                self.suspended.store(true, Ordering::SeqCst);
                return Err(e.context("Failed to start the output stream"));
            }
            tracing::debug!("Audio output resumed");
        }
        Ok(())
    }

    fn play(&self, buffer: &PcmBuffer) -> Result<()> {
        let samples = super::processing::to_device_layout(buffer, self.device_rate, self.device_channels)?;
        self.queue.lock().unwrap().extend(samples);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let dropped = {
            let mut queue = self.queue.lock().unwrap();
            let len = queue.len();
            queue.clear();
            len
        };
        tracing::info!("Stopped playback ({} queued samples dropped)", dropped);
        Ok(())
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        if !self.is_suspended() {
            let _ = self.control(StreamCommand::Pause);
        }
    }
}

fn build_stream(queue: SampleQueue) -> Result<(cpal::Stream, u32, u16)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No output device available")?;

    let config = device
        .default_output_config()
        .context("Failed to get default output config")?;

    let sample_format = config.sample_format();
    let stream_config: cpal::StreamConfig = config.into();
    let rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    let err_fn = |err| tracing::error!("Audio output error: {}", err);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut queue = queue.lock().unwrap();
                for sample in data.iter_mut() {
                    *sample = queue.pop_front().unwrap_or(0.0);
                }
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            &stream_config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                let mut queue = queue.lock().unwrap();
                for sample in data.iter_mut() {
                    *sample = super::processing::to_i16(queue.pop_front().unwrap_or(0.0));
                }
            },
            err_fn,
            None,
        ),
        other => anyhow::bail!("Unsupported output sample format: {:?}", other),
    }
    .context("Failed to build output stream")?;

    Ok((stream, rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct StreamLog {
        starts: AtomicUsize,
        halts: AtomicUsize,
        fail_start: AtomicBool,
    }

    struct FakeStream(Arc<StreamLog>);

    impl StreamControl for FakeStream {
        fn start(&self) -> Result<()> {
            if self.0.fail_start.load(Ordering::SeqCst) {
                anyhow::bail!("device unplugged");
            }
            self.0.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn halt(&self) -> Result<()> {
            self.0.halts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn output(log: &Arc<StreamLog>) -> CpalOutput {
        let log = Arc::clone(log);
        CpalOutput::spawn(24_000, move |_| Ok((FakeStream(log), 24_000, 2))).unwrap()
    }

    #[test]
    fn failed_start_leaves_output_suspended() {
        let log = Arc::new(StreamLog::default());
        log.fail_start.store(true, Ordering::SeqCst);
        let output = output(&log);

        let err = output.resume().unwrap_err();
        assert!(format!("{:#}", err).contains("device unplugged"));
        assert!(output.is_suspended());

        log.fail_start.store(false, Ordering::SeqCst);
        output.resume().unwrap();
        assert!(!output.is_suspended());
        assert_eq!(log.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resume_starts_the_stream_once() {
        let log = Arc::new(StreamLog::default());
        let output = output(&log);

        output.resume().unwrap();
        output.resume().unwrap();
        assert_eq!(log.starts.load(Ordering::SeqCst), 1);

        drop(output);
        assert_eq!(log.halts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn play_queues_device_layout_and_stop_clears_it() {
        let output = output(&Arc::new(StreamLog::default()));
        let buffer = PcmBuffer {
            sample_rate: 24_000,
            channels: vec![vec![0.25, -0.25, 0.5]],
        };

        output.play(&buffer).unwrap();
        assert_eq!(
            output.queue.lock().unwrap().iter().copied().collect::<Vec<_>>(),
            vec![0.25, 0.25, -0.25, -0.25, 0.5, 0.5]
        );

        output.stop().unwrap();
        assert!(output.queue.lock().unwrap().is_empty());
    }

    #[test]
    fn setup_failure_is_reported() {
        let result = CpalOutput::spawn(24_000, |_| -> Result<(FakeStream, u32, u16)> {
            anyhow::bail!("No output device available")
        });
        assert!(result.is_err());
    }
}
