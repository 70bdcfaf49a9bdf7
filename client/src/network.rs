use crate::input::{Command, InputManager};
use crate::rendering::Renderer;
use bincode::{deserialize, serialize};
use log::{debug, info, warn};
use shared::{Frame, Packet, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Thin client: shows frames and echoes the server's state blob back verbatim
pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,

    /// Last blob received from the server, never inspected here
    state: Option<String>,
    frame: Option<Frame>,

    fake_ping_ms: u64,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        fake_ping_ms: u64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            state: None,
            frame: None,
            fake_ping_ms,
        })
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        if self.fake_ping_ms > 0 {
            sleep(Duration::from_millis(self.fake_ping_ms / 2)).await;
        }

        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    async fn receive_packet(&self) -> Result<Packet, Box<dyn std::error::Error>> {
        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            let (len, addr) = timeout(REPLY_TIMEOUT, self.socket.recv_from(&mut buffer)).await??;
            if addr != self.server_addr {
                debug!("Ignoring datagram from {}", addr);
                continue;
            }

            if self.fake_ping_ms > 0 {
                sleep(Duration::from_millis(self.fake_ping_ms / 2)).await;
            }
            return Ok(deserialize::<Packet>(&buffer[0..len])?);
        }
    }

    /// Sends one request and waits for its frame
    async fn request(&mut self, packet: Packet) -> Result<&Frame, Box<dyn std::error::Error>> {
        self.send_packet(&packet).await?;

        match self.receive_packet().await? {
            Packet::Frame { frame, state } => {
                // The landing frame carries no state; keep nothing from before it
                self.state = state;
                Ok(self.frame.insert(frame))
            }
            Packet::Rejected { reason } => Err(format!("Server rejected request: {}", reason).into()),
            other => Err(format!("Unexpected packet: {:?}", other).into()),
        }
    }

    pub async fn landing(&mut self) -> Result<&Frame, Box<dyn std::error::Error>> {
        self.request(Packet::Landing).await
    }

    pub async fn press(&mut self, button_index: u8) -> Result<&Frame, Box<dyn std::error::Error>> {
        let packet = Packet::Press {
            button_index,
            state: self.state.clone(),
        };
        self.request(packet).await
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut renderer = Renderer::stdout();
        let mut input = InputManager::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let frame = self.landing().await?;
        renderer.render(frame)?;

        while let Some(line) = lines.next_line().await? {
            let button_count = self.frame.as_ref().map_or(0, |f| f.buttons.len());

            let result = match input.parse(&line, button_count) {
                Some(Command::Press(button)) => self.press(button).await,
                Some(Command::Restart) => {
                    info!("Restarting from the landing frame");
                    self.state = None;
                    self.landing().await
                }
                Some(Command::Quit) => break,
                None => {
                    renderer.notice("Type a button number, r to restart or q to quit")?;
                    continue;
                }
            };

            match result {
                Ok(frame) => renderer.render(frame)?,
                Err(e) => {
                    warn!("Request failed: {}", e);
                    renderer.notice(&e.to_string())?;
                }
            }
        }

        info!(
            "Sent {} presses, drew {} frames",
            input.presses_sent(),
            renderer.frames_drawn()
        );
        Ok(())
    }
}
