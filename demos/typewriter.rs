//! Terminal host for a typewriter animation.
//!
//! ```text
//! cargo run --example typewriter -- "Hi, I'm typing" 15
//! ```
//!
//! The first argument is the text, the second how many seconds to run.

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use typewriter::prelude::*;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| "Hello, world".to_string());
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);

    let mut event_loop: EventLoop<'static, ()> =
        EventLoop::try_new().expect("Failed to create event loop");
    let scheduler = Rc::new(LoopScheduler::new(event_loop.handle()));

    let typewriter = Typewriter::new(
        AnimationConfig::new(text)
            .typing_delay(Duration::from_millis(100))
            .loop_delay(Duration::from_millis(2000)),
        scheduler,
    );

    typewriter.subscribe(|snapshot| {
        let mut stdout = std::io::stdout();
        // Clear the line and redraw with a caret
        let _ = write!(stdout, "\r\x1b[2K{}\u{258f}", snapshot.text);
        let _ = stdout.flush();
    });

    let signal = event_loop.get_signal();
    event_loop
        .handle()
        .insert_source(
            Timer::from_duration(Duration::from_secs(seconds)),
            move |_, _, _| {
                signal.stop();
                TimeoutAction::Drop
            },
        )
        .expect("Failed to register stop timer");

    log::info!("Running typewriter for {}s", seconds);
    event_loop
        .run(None, &mut (), |_| {})
        .expect("Event loop failed");

    typewriter.destroy();
    println!();
}
