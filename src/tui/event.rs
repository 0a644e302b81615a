use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

pub enum Event {
    Input(KeyEvent),
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            Self::event_loop(tx, tick_rate);
        });

        EventHandler { rx }
    }

    /// 事件循环处理函数，接收端关闭或终端读取失败时退出
    fn event_loop(tx: mpsc::Sender<Event>, tick_rate: Duration) {
        let mut last_tick = Instant::now();

        loop {
            let timeout = Self::calculate_timeout(tick_rate, last_tick);

            match event::poll(timeout) {
                Ok(true) => match event::read() {
                    // 只处理按下事件，避免 Windows 上按下/释放各触发一次
                    Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(Event::Input(key)).is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => return,
                },
                Ok(false) => {}
                Err(_) => return,
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    }

    /// 计算超时时间
    fn calculate_timeout(tick_rate: Duration, last_tick: Instant) -> Duration {
        tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0))
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
