use std::fmt::{Display, Formatter};
use std::io::Write;
use std::time::Instant;

use std::sync::mpsc::{channel, Sender};
use std::thread::ThreadId;
#[cfg(feature = "buffered_out")]
use std::io::BufWriter;

use console::{pad_str, pad_str_with, style, Alignment};

/// Struct to hold the UI
/// Particulary the receiver channel
pub struct UI {
    sender: UISender,
}

#[derive(Clone)]
pub struct UISender {
    sender: Sender<UIMessage>,
}

impl UISender {
    /// Send typed UIMessage to internal channel.
    /// Messages to a closed channel are dropped.
    pub fn send(&self, user_msg: UIUserMessage) {
        #[cfg(not(feature = "disable_ui"))]
        let _ = self.sender.send(UIMessage {
            thread_id: std::thread::current().id(),
            message: user_msg,
        });
    }

    /// Sender without a printer attached, every message is discarded
    pub fn disconnected() -> Self {
        let (sender, _) = channel();
        UISender { sender }
    }
}

impl Default for UI {
    fn default() -> Self {
        UI::new()
    }
}

impl UI {
    pub fn get_sender(&self) -> UISender {
        self.sender.clone()
    }

    pub fn new() -> Self {
        let (sender, receiver) = channel::<UIMessage>();

        #[cfg(not(feature = "disable_ui"))]
        std::thread::spawn(move || {
            #[cfg(not(feature = "locked_out"))]
            let stdout = std::io::stdout();
            #[cfg(feature = "locked_out")]
            let stdout = std::io::stdout().lock();

            #[cfg(not(feature = "buffered_out"))]
            let mut buffered_out = stdout;
            #[cfg(feature = "buffered_out")]
            let mut buffered_out = BufWriter::with_capacity(512, stdout);

            let start_time = Instant::now();

            let mut total_pricing_runtime = 0.0;
            let mut pricing_calls = 0usize;
            let mut fallback_calls = 0usize;
            let mut columns_generated = 0usize;

            // all senders gone also ends the printer
            while let Ok(UIMessage { thread_id, message }) = receiver.recv() {
                match message {
                    UIUserMessage::Log(msg) => {
                        writeln!(&mut buffered_out, "[{:?}] {:>6.2}  {}", thread_id, start_time.elapsed().as_secs_f64(), msg).unwrap_or(())
                    }
                    UIUserMessage::LogS(msg) => {
                        writeln!(&mut buffered_out, "[{:?}] {:>6.2}  {}", thread_id, start_time.elapsed().as_secs_f64(), msg).unwrap_or(())
                    }
                    UIUserMessage::InstanceConfigured(state) => {
                        writeln!(&mut buffered_out, "{}", pad_str_with(&format!("{:?}", thread_id), 30, Alignment::Center, None, '⎯')).unwrap_or(());
                        writeln!(&mut buffered_out, "{}", style(pad_str("Pricing configured", 30, Alignment::Center, None)).green()).unwrap_or(());
                        writeln!(&mut buffered_out, "{}", state).unwrap_or(());
                        writeln!(&mut buffered_out, "{}", "⎯".repeat(30)).unwrap_or(());
                        buffered_out.flush().unwrap_or(());
                    }
                    UIUserMessage::NodeRowsRebuilt(state) => {
                        writeln!(&mut buffered_out, "[{t:?}] {time:>6.2} node rows {state}",
                                 t = thread_id,
                                 time = start_time.elapsed().as_secs_f64(),
                                 state = state
                        ).unwrap_or(());
                    }
                    UIUserMessage::PricingFinish(state) => {
                        // always needed for statistics
                        total_pricing_runtime += state.runtime;
                        pricing_calls += 1;
                        columns_generated += state.num_columns;
                        if state.path == PricingPath::Fallback {
                            fallback_calls += 1;
                        }

                        /* noisy */
                        writeln!(&mut buffered_out, "{}", style(format!("[{t:?}] {time:>6.2} pricing iteration {state}",
                                 t = thread_id,
                                 time = start_time.elapsed().as_secs_f64(),
                                 state = state
                        )).dim()).unwrap_or(());
                    }
                    UIUserMessage::ExitUi => {
                        writeln!(&mut buffered_out, "{}", pad_str_with("Statistics", 30, Alignment::Center, None, '⎯')).unwrap_or(());
                        writeln!(&mut buffered_out, "total_pricing_time: {:>8.2}s / pricing_calls: {} / columns: {}", total_pricing_runtime, pricing_calls, columns_generated).unwrap_or(());
                        if pricing_calls > 0 {
                            writeln!(&mut buffered_out, "{:>3.1}% of calls fell back to the exact solver", fallback_calls as f64 / pricing_calls as f64 * 100.0).unwrap_or(());
                        }
                        writeln!(&mut buffered_out, "{}", "⎯".repeat(30)).unwrap_or(());
                        break;
                    }
                }
            }

            buffered_out.flush().unwrap_or(());
        });

        #[cfg(feature = "disable_ui")]
        drop(receiver);

        Self {
            sender: UISender { sender },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which branch of the pricing state machine produced the result
pub enum PricingPath {
    /// The knapsack oracle found nothing worth reporting
    NoColumn,
    /// The knapsack optimum satisfied every row of the pricing model
    FastPath,
    /// The knapsack optimum broke a row and the exact solver took over
    Fallback,
}

impl Display for PricingPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingPath::NoColumn => write!(f, "none"),
            PricingPath::FastPath => write!(f, "knapsack"),
            PricingPath::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Clone)]
pub struct InstanceUIState {
    pub num_items: usize,
    pub num_vars: usize,
    pub max_bits: u32,
    pub knife_limit: Option<u32>,
}

impl Display for InstanceUIState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "items=<{}> vars=<{}> max_bits=<{}> knives=<{}>", self.num_items, self.num_vars, self.max_bits,
               self.knife_limit.map(|k| k.to_string()).unwrap_or_else(|| "-".to_string()))
    }
}

#[derive(Clone)]
pub struct NodeUIState {
    pub excluded: usize,
    pub exclusion_rows: usize,
    pub parity_rows: usize,
    pub mir_rows: usize,
}

impl Display for NodeUIState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "excluded=<{}> exclusion=<{}> parity=<{}> mir=<{}>", self.excluded, self.exclusion_rows, self.parity_rows, self.mir_rows)
    }
}

#[derive(Clone)]
pub struct PricingUIState {
    pub runtime: f64,
    pub path: PricingPath,
    pub pool_size: usize,
    pub perturbation_rounds: usize,
    pub num_columns: usize,
    pub best_reduced_cost: Option<f64>,
}

impl Display for PricingUIState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pricing_runtime=<{:>5.2}> path=<{}> pool=<{}> perturbed=<{}> num_cols=<{}> best_dj=<{}>",
               self.runtime, self.path, self.pool_size, self.perturbation_rounds, self.num_columns,
               self.best_reduced_cost.map(|dj| format!("{:>10.8}", dj)).unwrap_or_else(|| "-".to_string()))
    }
}

#[derive(Clone)]
/// Holds all state updates that can influence the UI
pub enum UIUserMessage {
    LogS(&'static str),
    Log(String),
    InstanceConfigured(InstanceUIState),
    NodeRowsRebuilt(NodeUIState),
    PricingFinish(PricingUIState),
    ExitUi,
}

#[derive(Clone)]
pub struct UIMessage {
    pub thread_id: ThreadId,
    pub message: UIUserMessage,
}
