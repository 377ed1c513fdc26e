#[derive(Debug, Clone)]
pub enum Message {
    /// Any key was pressed: move on to the next set of panels
    Advance,
}
