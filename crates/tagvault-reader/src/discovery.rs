// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finding the one serial device allowed to act as the tag reader.
//!
//! Only the port's USB identity is checked. A device that reports a matching
//! manufacturer and serial number is trusted.

use std::fmt;

use serialport::{SerialPortInfo, SerialPortType};
use tagvault_config::ReaderConfig;
use tagvault_core::HardwareError;

/// Manufacturer and serial-number substrings a reader must report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    pub manufacturer: String,
    pub serial_number: String,
}

impl From<&ReaderConfig> for AllowList {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            manufacturer: config.manufacturer.clone(),
            serial_number: config.serial_number.clone(),
        }
    }
}

impl AllowList {
    /// True for a USB port whose descriptors contain both configured strings.
    pub fn permits(&self, info: &SerialPortInfo) -> bool {
        match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                contains(usb.manufacturer.as_deref(), &self.manufacturer)
                    && contains(usb.serial_number.as_deref(), &self.serial_number)
            }
            _ => false,
        }
    }
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.contains(needle))
}

/// Pick the first permitted port out of `ports`.
pub fn select_authorized_port<'a>(
    ports: &'a [SerialPortInfo],
    allow: &AllowList,
) -> Result<&'a SerialPortInfo, HardwareError> {
    if ports.is_empty() {
        return Err(HardwareError::UnauthorizedOrAbsent(
            "no serial ports found".to_string(),
        ));
    }
    ports.iter().find(|info| allow.permits(info)).ok_or_else(|| {
        HardwareError::UnauthorizedOrAbsent(format!(
            "no authorized reader among {} serial port(s)",
            ports.len()
        ))
    })
}

/// Enumerate the system's serial ports.
pub fn available_ports() -> Result<Vec<SerialPortInfo>, HardwareError> {
    serialport::available_ports()
        .map_err(|err| HardwareError::Io(format!("failed to enumerate serial ports: {err}")))
}

/// Path of the authorized reader currently attached.
pub fn discover_authorized_device(allow: &AllowList) -> Result<String, HardwareError> {
    let ports = available_ports()?;
    select_authorized_port(&ports, allow).map(|info| info.port_name.clone())
}

/// One line of the `ports` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub port_name: String,
    pub kind: &'static str,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub product: Option<String>,
    pub vid_pid: Option<(u16, u16)>,
}

impl From<&SerialPortInfo> for PortSummary {
    fn from(info: &SerialPortInfo) -> Self {
        let mut summary = PortSummary {
            port_name: info.port_name.clone(),
            kind: "unknown",
            manufacturer: None,
            serial_number: None,
            product: None,
            vid_pid: None,
        };
        match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                summary.kind = "usb";
                summary.manufacturer = usb.manufacturer.clone();
                summary.serial_number = usb.serial_number.clone();
                summary.product = usb.product.clone();
                summary.vid_pid = Some((usb.vid, usb.pid));
            }
            SerialPortType::PciPort => summary.kind = "pci",
            SerialPortType::BluetoothPort => summary.kind = "bluetooth",
            _ => {}
        }
        summary
    }
}

impl fmt::Display for PortSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.port_name, self.kind)?;
        if let Some((vid, pid)) = self.vid_pid {
            write!(f, " {vid:04x}:{pid:04x}")?;
        }
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        if self.kind == "usb" {
            write!(
                f,
                " manufacturer={} serial={} product={}",
                show(&self.manufacturer),
                show(&self.serial_number),
                show(&self.product)
            )?;
        }
        Ok(())
    }
}

/// Describe every serial port for operators filling in the allow-list.
pub fn list_ports() -> Result<Vec<PortSummary>, HardwareError> {
    Ok(available_ports()?.iter().map(PortSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb_port(name: &str, manufacturer: Option<&str>, serial: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: serial.map(str::to_string),
                manufacturer: manufacturer.map(str::to_string),
                product: Some("Uno".to_string()),
            }),
        }
    }

    fn non_usb_port(name: &str) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::PciPort,
        }
    }

    fn allow() -> AllowList {
        AllowList {
            manufacturer: "Arduino".to_string(),
            serial_number: "5573532373535151D062".to_string(),
        }
    }

    #[test]
    fn matching_usb_port_is_selected() {
        let ports = vec![
            non_usb_port("/dev/ttyS0"),
            usb_port("/dev/ttyUSB0", Some("FTDI"), Some("A1")),
            usb_port(
                "/dev/ttyACM0",
                Some("Arduino (www.arduino.cc)"),
                Some("5573532373535151D062"),
            ),
        ];
        let port = select_authorized_port(&ports, &allow()).unwrap();
        assert_eq!(port.port_name, "/dev/ttyACM0");
    }

    #[test]
    fn wrong_serial_is_not_authorized() {
        let ports = vec![usb_port("/dev/ttyACM0", Some("Arduino"), Some("OTHER"))];
        let err = select_authorized_port(&ports, &allow()).unwrap_err();
        assert!(matches!(err, HardwareError::UnauthorizedOrAbsent(msg) if msg.contains("no authorized reader")));
    }

    #[test]
    fn missing_descriptors_are_not_authorized() {
        let ports = vec![usb_port("/dev/ttyACM0", None, Some("5573532373535151D062"))];
        assert!(select_authorized_port(&ports, &allow()).is_err());
    }

    #[test]
    fn no_ports_is_reported_separately() {
        let err = select_authorized_port(&[], &allow()).unwrap_err();
        assert!(matches!(err, HardwareError::UnauthorizedOrAbsent(msg) if msg == "no serial ports found"));
    }

    #[test]
    fn summary_shows_usb_identity() {
        let summary = PortSummary::from(&usb_port("/dev/ttyACM0", Some("Arduino"), None));
        assert_eq!(
            summary.to_string(),
            "/dev/ttyACM0 [usb] 2341:0043 manufacturer=Arduino serial=- product=Uno"
        );
        assert_eq!(PortSummary::from(&non_usb_port("/dev/ttyS0")).to_string(), "/dev/ttyS0 [pci]");
    }
}
