// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Text framing for Engine.IO v4 and the Socket.IO v5 packets carried inside
//! its `message` packets. Only what a WebSocket-transport client needs is
//! covered; binary attachments are rejected.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_NAMESPACE: &str = "/";

/// Handshake data sent by the server in the `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| anyhow!("empty engine.io frame"))?;
        let data = chars.as_str();

        let packet = match kind {
            '0' => Self::Open(serde_json::from_str(data).context("decode engine.io handshake")?),
            '1' => Self::Close,
            '2' => Self::Ping(data.to_owned()),
            '3' => Self::Pong(data.to_owned()),
            '4' => Self::Message(data.to_owned()),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            other => bail!("unknown engine.io packet type {other:?}"),
        };
        Ok(packet)
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => {
                let data = serde_json::to_string(handshake).unwrap_or_else(|_| "{}".to_owned());
                format!("0{data}")
            }
            Self::Close => "1".to_owned(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".to_owned(),
            Self::Noop => "6".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    pub fn connect(namespace: &str) -> Self {
        Self::Connect {
            namespace: namespace.to_owned(),
            data: None,
        }
    }

    pub fn event(name: &str, args: Vec<Value>) -> Self {
        Self::Event {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            id: None,
            name: name.to_owned(),
            args,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    pub fn decode(payload: &str) -> Result<Self> {
        let mut chars = payload.chars();
        let kind = chars
            .next()
            .ok_or_else(|| anyhow!("empty socket.io packet"))?;
        if matches!(kind, '5' | '6') {
            bail!("binary socket.io packets are not supported");
        }

        let (namespace, rest) = split_namespace(chars.as_str());
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (id_text, json) = rest.split_at(digits);
        let id = if id_text.is_empty() {
            None
        } else {
            Some(
                id_text
                    .parse::<u64>()
                    .with_context(|| format!("invalid socket.io ack id {id_text:?}"))?,
            )
        };
        let data = if json.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(json).context("decode socket.io packet data")?)
        };

        let packet = match kind {
            '0' => Self::Connect { namespace, data },
            '1' => Self::Disconnect { namespace },
            '2' => {
                let Some(Value::Array(mut items)) = data else {
                    bail!("socket.io event without an argument array");
                };
                if items.is_empty() {
                    bail!("socket.io event without a name");
                }
                let Value::String(name) = items.remove(0) else {
                    bail!("socket.io event name must be a string");
                };
                Self::Event {
                    namespace,
                    id,
                    name,
                    args: items,
                }
            }
            '3' => {
                let id = id.ok_or_else(|| anyhow!("socket.io ack without an id"))?;
                let args = match data {
                    Some(Value::Array(items)) => items,
                    Some(_) => bail!("socket.io ack data must be an array"),
                    None => Vec::new(),
                };
                Self::Ack {
                    namespace,
                    id,
                    args,
                }
            }
            '4' => Self::ConnectError { namespace, data },
            other => bail!("unknown socket.io packet type {other:?}"),
        };
        Ok(packet)
    }

    pub fn encode(&self) -> String {
        let (kind, id, data) = match self {
            Self::Connect { data, .. } => ('0', None, data.clone()),
            Self::Disconnect { .. } => ('1', None, None),
            Self::Event { id, name, args, .. } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                ('2', *id, Some(Value::Array(items)))
            }
            Self::Ack { id, args, .. } => ('3', Some(*id), Some(Value::Array(args.clone()))),
            Self::ConnectError { data, .. } => ('4', None, data.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Wrapped in an engine.io `message` packet, ready for the wire.
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

/// Human-readable reason from a `connect_error` payload.
pub fn connect_error_message(data: Option<&Value>) -> String {
    match data {
        Some(Value::Object(object)) => object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("connection refused")
            .to_owned(),
        Some(Value::String(message)) => message.clone(),
        _ => "connection refused".to_owned(),
    }
}

fn split_namespace(rest: &str) -> (String, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_owned(), rest);
    }
    match rest.find(',') {
        Some(index) => (rest[..index].to_owned(), &rest[index + 1..]),
        None => (rest.to_owned(), ""),
    }
}
