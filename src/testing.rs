//! Host-side doubles for the hardware and network traits.
//!
//! Handles are cheap clones sharing state through `Rc`, so a test can move one
//! copy into the code under test and inspect another afterwards. The TCP and
//! DNS doubles are borrowed instead, the way the client borrows the real stack.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType as PinErrorType, InputPin};
use embedded_io_async::{ErrorType, Read, Write};
use embedded_nal_async::{AddrType, Dns, TcpConnect};

use crate::clock::{self, WallClock};
use crate::error::{DisplayError, HttpError, NetError, SensorError, TimeError};
use crate::influx::Metric;
use crate::model::{DisplayState, Field, Reading};
use crate::traits::{Connection, DisplaySink, LinkInfo, Listener, SensorSource, Uplink};

/// Digital input with a settable level
#[derive(Clone)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
    failing: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
            failing: Rc::new(Cell::new(false)),
        }
    }

    pub fn set(&self, level: bool) {
        self.level.set(level);
    }

    pub fn fail(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl PinErrorType for MockPin {
    type Error = ErrorKind;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        if self.failing.get() {
            return Err(ErrorKind::Other);
        }
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        self.is_high().map(|high| !high)
    }
}

/// Display sink that records every rendered field
#[derive(Clone, Default)]
pub struct RecordingSink {
    renders: Rc<RefCell<Vec<(Field, String)>>>,
    brightness: Rc<RefCell<Vec<f32>>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> Vec<(Field, String)> {
        self.renders.borrow().clone()
    }

    pub fn brightness_calls(&self) -> Vec<f32> {
        self.brightness.borrow().clone()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl DisplaySink for RecordingSink {
    fn render(&mut self, state: &DisplayState, changed: Field) -> Result<(), DisplayError> {
        if self.failing.get() {
            return Err(DisplayError::Bus);
        }
        let text = state.label(changed).text.as_str().to_string();
        self.renders.borrow_mut().push((changed, text));
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        if self.failing.get() {
            return Err(DisplayError::Bus);
        }
        self.brightness.borrow_mut().push(level);
        Ok(())
    }
}

/// Sensor replaying queued results, `NotReady` once drained
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    script: Rc<RefCell<VecDeque<Result<Reading, SensorError>>>>,
    reads: Rc<Cell<usize>>,
}

impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Result<Reading, SensorError>>) -> Self {
        let sensor = Self::default();
        sensor.script.borrow_mut().extend(script);
        sensor
    }

    pub fn push(&self, result: Result<Reading, SensorError>) {
        self.script.borrow_mut().push_back(result);
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl SensorSource for ScriptedSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.reads.set(self.reads.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(SensorError::NotReady))
    }
}

#[derive(Default)]
struct UplinkLog {
    time_body: Option<String>,
    hang_time: bool,
    time_fetches: usize,
    failing: Vec<String>,
    lines: Vec<String>,
}

/// Uplink serving a canned time payload and recording metric lines
#[derive(Clone, Default)]
pub struct MockUplink {
    log: Rc<RefCell<UplinkLog>>,
}

impl MockUplink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, just_time: &str, am_pm: &str, month: &str, day: &str) {
        self.log.borrow_mut().time_body = Some(format!(
            r#"[{{"just_time":"{}","am_pm":"{}","month":"{}","day":"{}"}}]"#,
            just_time, am_pm, month, day
        ));
    }

    /// Make time fetches never complete
    pub fn hang_time(&self, hang: bool) {
        self.log.borrow_mut().hang_time = hang;
    }

    pub fn fail_measurement(&self, measurement: &str) {
        self.log.borrow_mut().failing.push(measurement.to_string());
    }

    pub fn time_fetches(&self) -> usize {
        self.log.borrow().time_fetches
    }

    pub fn lines(&self) -> Vec<String> {
        self.log.borrow().lines.clone()
    }
}

impl Uplink for MockUplink {
    async fn fetch_time(&mut self) -> Result<WallClock, TimeError> {
        let (hang, body) = {
            let mut log = self.log.borrow_mut();
            log.time_fetches += 1;
            (log.hang_time, log.time_body.clone())
        };
        if hang {
            core::future::pending::<()>().await;
        }
        match body {
            Some(body) => clock::parse(body.as_bytes()),
            None => Err(TimeError::Http(HttpError::Net(NetError::Connect))),
        }
    }

    async fn write_metric(&mut self, metric: &Metric<'_>) -> Result<(), HttpError> {
        let line = metric.line()?;
        let mut log = self.log.borrow_mut();
        log.lines.push(line.as_str().to_string());
        if log.failing.iter().any(|m| m == metric.measurement) {
            return Err(HttpError::Status(500));
        }
        Ok(())
    }
}

pub struct MockLink {
    ipv4: Option<[u8; 4]>,
    rssi: Option<i32>,
}

impl MockLink {
    pub fn new(ipv4: Option<[u8; 4]>, rssi: Option<i32>) -> Self {
        Self { ipv4, rssi }
    }
}

impl LinkInfo for MockLink {
    fn ipv4(&self) -> Option<[u8; 4]> {
        self.ipv4
    }

    fn rssi(&mut self) -> Option<i32> {
        self.rssi
    }
}

/// In-memory stream: reads from a fixed input, records writes
pub struct MemoryConn {
    input: Vec<u8>,
    pos: usize,
    output: Rc<RefCell<Vec<u8>>>,
    closed: Rc<Cell<bool>>,
    fail_writes: bool,
}

impl ErrorType for MemoryConn {
    type Error = NetError;
}

impl Read for MemoryConn {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let n = buf.len().min(self.input.len() - self.pos);
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MemoryConn {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        if self.fail_writes {
            return Err(NetError::Write);
        }
        self.output.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), NetError> {
        Ok(())
    }
}

impl Connection for MemoryConn {
    async fn close(&mut self) {
        self.closed.set(true);
    }
}

/// Opened connections, kept for inspection
#[derive(Default)]
struct Transcript {
    outputs: Vec<Rc<RefCell<Vec<u8>>>>,
    closes: Vec<Rc<Cell<bool>>>,
}

impl Transcript {
    fn open(&mut self, input: Vec<u8>, fail_writes: bool) -> MemoryConn {
        let output = Rc::new(RefCell::new(Vec::new()));
        let closed = Rc::new(Cell::new(false));
        self.outputs.push(output.clone());
        self.closes.push(closed.clone());
        MemoryConn {
            input,
            pos: 0,
            output,
            closed,
            fail_writes,
        }
    }

    fn written(&self) -> Vec<String> {
        self.outputs
            .iter()
            .map(|out| String::from_utf8_lossy(&out.borrow()).into_owned())
            .collect()
    }

    fn all_closed(&self) -> bool {
        self.closes.iter().all(|closed| closed.get())
    }
}

#[derive(Default)]
struct TcpState {
    responses: VecDeque<Result<Vec<u8>, NetError>>,
    remotes: Vec<SocketAddr>,
    transcript: Transcript,
}

/// TCP stack answering each connect with the next queued response
#[derive(Default)]
pub struct MockTcp {
    state: RefCell<TcpState>,
}

impl MockTcp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: &[u8]) {
        self.state
            .borrow_mut()
            .responses
            .push_back(Ok(response.to_vec()));
    }

    pub fn refuse(&self) {
        self.state
            .borrow_mut()
            .responses
            .push_back(Err(NetError::Connect));
    }

    /// Requests as written by the client, one per connection
    pub fn sent(&self) -> Vec<String> {
        self.state.borrow().transcript.written()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.state
            .borrow()
            .remotes
            .iter()
            .map(|remote| remote.port())
            .collect()
    }
}

impl TcpConnect for MockTcp {
    type Error = NetError;
    type Connection<'a>
        = MemoryConn
    where
        Self: 'a;

    async fn connect<'a>(&'a self, remote: SocketAddr) -> Result<Self::Connection<'a>, NetError> {
        let mut state = self.state.borrow_mut();
        state.remotes.push(remote);
        let response = state
            .responses
            .pop_front()
            .unwrap_or(Err(NetError::Connect))?;
        Ok(state.transcript.open(response, false))
    }
}

/// Resolver mapping every name to the loopback address
#[derive(Default)]
pub struct MockDns {
    lookups: RefCell<Vec<String>>,
    failing: Cell<bool>,
}

impl MockDns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl Dns for MockDns {
    type Error = NetError;

    async fn get_host_by_name(&self, host: &str, _addr_type: AddrType) -> Result<IpAddr, NetError> {
        self.lookups.borrow_mut().push(host.to_string());
        if self.failing.get() {
            return Err(NetError::Dns);
        }
        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    async fn get_host_by_address(&self, _addr: IpAddr, _result: &mut [u8]) -> Result<usize, NetError> {
        Err(NetError::Dns)
    }
}

#[derive(Default)]
struct ListenerState {
    pending: VecDeque<Result<Vec<u8>, NetError>>,
    fail_writes: bool,
    transcript: Transcript,
}

/// Inbound listener; accepts never complete while the queue is empty
#[derive(Clone, Default)]
pub struct MockListener {
    state: Rc<RefCell<ListenerState>>,
}

impl MockListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a client that sends `request`
    pub fn incoming(&self, request: &[u8]) {
        self.state
            .borrow_mut()
            .pending
            .push_back(Ok(request.to_vec()));
    }

    pub fn accept_error(&self, err: NetError) {
        self.state.borrow_mut().pending.push_back(Err(err));
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Bytes written back to each accepted client
    pub fn replies(&self) -> Vec<String> {
        self.state.borrow().transcript.written()
    }

    pub fn all_closed(&self) -> bool {
        self.state.borrow().transcript.all_closed()
    }
}

impl Listener for MockListener {
    type Conn<'a>
        = MemoryConn
    where
        Self: 'a;

    async fn accept(&mut self) -> Result<Self::Conn<'_>, NetError> {
        let next = self.state.borrow_mut().pending.pop_front();
        match next {
            Some(Ok(request)) => {
                let mut state = self.state.borrow_mut();
                let fail_writes = state.fail_writes;
                Ok(state.transcript.open(request, fail_writes))
            }
            Some(Err(e)) => Err(e),
            None => core::future::pending().await,
        }
    }
}
