//! Reference message layouts.
//!
//! Command codes follow JAUS 3.x: commands live below 0x2000, queries in
//! 0x2000-0x3FFF and informs (reports) from 0x4000.

use std::f64::consts::PI;

use crate::layout::{FieldDescriptor, FieldKind, MessageLayout};

/// Command codes of the shipped layouts.
pub mod code {
    pub const CONFIRM_SERVICE_CONNECTION: u16 = 0x0009;
    pub const REQUEST_COMPONENT_CONTROL: u16 = 0x000D;
    pub const QUERY_COMPONENT_STATUS: u16 = 0x2002;
    pub const QUERY_GLOBAL_POSE: u16 = 0x2402;
    pub const QUERY_VELOCITY_STATE: u16 = 0x2404;
    pub const QUERY_DISCRETE_DEVICES: u16 = 0x2406;
    pub const REPORT_VELOCITY_STATE: u16 = 0x4404;
}

/// Presence vector bits shared by Query/Report Velocity State.
pub mod velocity_bits {
    pub const VELOCITY_X: usize = 0;
    pub const VELOCITY_Y: usize = 1;
    pub const VELOCITY_Z: usize = 2;
    pub const VELOCITY_RMS: usize = 3;
    pub const ROLL_RATE: usize = 4;
    pub const PITCH_RATE: usize = 5;
    pub const YAW_RATE: usize = 6;
    pub const RATE_RMS: usize = 7;
    pub const TIME_STAMP: usize = 8;
}

/// Presence vector bits of Query Global Pose.
pub mod global_pose_bits {
    pub const LATITUDE: usize = 0;
    pub const LONGITUDE: usize = 1;
    pub const ELEVATION: usize = 2;
    pub const POSITION_RMS: usize = 3;
    pub const ROLL: usize = 4;
    pub const PITCH: usize = 5;
    pub const YAW: usize = 6;
    pub const ATTITUDE_RMS: usize = 7;
    pub const TIME_STAMP: usize = 8;
}

/// Presence vector bits of Query Discrete Devices.
pub mod discrete_devices_bits {
    pub const MAIN_PROPULSION: usize = 0;
    pub const PARKING_BRAKE_HORN: usize = 1;
    pub const GEAR: usize = 2;
    pub const TRANSFER_CASE: usize = 3;
}

const SHORT_PV: FieldDescriptor =
    FieldDescriptor::new("presence_vector", FieldKind::ShortPresenceVector);

pub static CONFIRM_SERVICE_CONNECTION: MessageLayout = MessageLayout {
    name: "ConfirmServiceConnection",
    command_code: code::CONFIRM_SERVICE_CONNECTION,
    max_data_size: 6,
    fields: &[
        FieldDescriptor::new("service_command_code", FieldKind::UnsignedShort),
        FieldDescriptor::new("instance_id", FieldKind::Byte),
        FieldDescriptor::new("confirmed_rate_hz", FieldKind::UnsignedShort).scaled(0.0, 1092.0),
        FieldDescriptor::new("response_code", FieldKind::Byte),
    ],
};

pub static REQUEST_COMPONENT_CONTROL: MessageLayout = MessageLayout {
    name: "RequestComponentControl",
    command_code: code::REQUEST_COMPONENT_CONTROL,
    max_data_size: 1,
    fields: &[FieldDescriptor::new("authority_code", FieldKind::Byte)],
};

pub static QUERY_COMPONENT_STATUS: MessageLayout = MessageLayout {
    name: "QueryComponentStatus",
    command_code: code::QUERY_COMPONENT_STATUS,
    max_data_size: 0,
    fields: &[],
};

pub static QUERY_GLOBAL_POSE: MessageLayout = MessageLayout {
    name: "QueryGlobalPose",
    command_code: code::QUERY_GLOBAL_POSE,
    max_data_size: 2,
    fields: &[SHORT_PV],
};

pub static QUERY_VELOCITY_STATE: MessageLayout = MessageLayout {
    name: "QueryVelocityState",
    command_code: code::QUERY_VELOCITY_STATE,
    max_data_size: 2,
    fields: &[SHORT_PV],
};

pub static QUERY_DISCRETE_DEVICES: MessageLayout = MessageLayout {
    name: "QueryDiscreteDevices",
    command_code: code::QUERY_DISCRETE_DEVICES,
    max_data_size: 1,
    fields: &[FieldDescriptor::new(
        "presence_vector",
        FieldKind::BytePresenceVector,
    )],
};

/// Velocities in m/s, rates in rad/s, time stamp unscaled.
pub static REPORT_VELOCITY_STATE: MessageLayout = MessageLayout {
    name: "ReportVelocityState",
    command_code: code::REPORT_VELOCITY_STATE,
    max_data_size: 30,
    fields: &[
        SHORT_PV,
        FieldDescriptor::new("velocity_x", FieldKind::Integer)
            .optional(velocity_bits::VELOCITY_X)
            .scaled(-65.534, 65.534),
        FieldDescriptor::new("velocity_y", FieldKind::Integer)
            .optional(velocity_bits::VELOCITY_Y)
            .scaled(-65.534, 65.534),
        FieldDescriptor::new("velocity_z", FieldKind::Integer)
            .optional(velocity_bits::VELOCITY_Z)
            .scaled(-65.534, 65.534),
        FieldDescriptor::new("velocity_rms", FieldKind::UnsignedInteger)
            .optional(velocity_bits::VELOCITY_RMS)
            .scaled(0.0, 100.0),
        FieldDescriptor::new("roll_rate", FieldKind::Short)
            .optional(velocity_bits::ROLL_RATE)
            .scaled(-32.767, 32.767),
        FieldDescriptor::new("pitch_rate", FieldKind::Short)
            .optional(velocity_bits::PITCH_RATE)
            .scaled(-32.767, 32.767),
        FieldDescriptor::new("yaw_rate", FieldKind::Short)
            .optional(velocity_bits::YAW_RATE)
            .scaled(-32.767, 32.767),
        FieldDescriptor::new("rate_rms", FieldKind::UnsignedShort)
            .optional(velocity_bits::RATE_RMS)
            .scaled(0.0, PI),
        FieldDescriptor::new("time_stamp", FieldKind::UnsignedInteger)
            .optional(velocity_bits::TIME_STAMP),
    ],
};

/// Every shipped layout, ordered by command code.
pub static ALL: [&MessageLayout; 7] = [
    &CONFIRM_SERVICE_CONNECTION,
    &REQUEST_COMPONENT_CONTROL,
    &QUERY_COMPONENT_STATUS,
    &QUERY_GLOBAL_POSE,
    &QUERY_VELOCITY_STATE,
    &QUERY_DISCRETE_DEVICES,
    &REPORT_VELOCITY_STATE,
];

/// Resolve the layout for a command code.
pub fn lookup(command_code: u16) -> Option<&'static MessageLayout> {
    ALL.iter()
        .copied()
        .find(|layout| layout.command_code == command_code)
}

/// Human-readable name for a command code.
pub fn command_name(command_code: u16) -> &'static str {
    match lookup(command_code) {
        Some(layout) => layout.name,
        None => match command_code {
            0x0000..=0x1FFF => "UNKNOWN_COMMAND",
            0x2000..=0x3FFF => "UNKNOWN_QUERY",
            _ => "UNKNOWN_INFORM",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HEADER_SIZE;
    use crate::message::Message;

    #[test]
    fn all_layouts_validate() {
        for layout in ALL {
            layout.validate().unwrap();
            assert_eq!(layout.full_payload_size(), layout.max_data_size, "{}", layout.name);
        }
    }

    #[test]
    fn codes_are_unique_and_sorted() {
        for pair in ALL.windows(2) {
            assert!(pair[0].command_code < pair[1].command_code);
        }
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(
            lookup(code::REPORT_VELOCITY_STATE).map(|l| l.name),
            Some("ReportVelocityState")
        );
        assert!(lookup(0x7777).is_none());
        assert_eq!(command_name(code::QUERY_COMPONENT_STATUS), "QueryComponentStatus");
        assert_eq!(command_name(0x2FFF), "UNKNOWN_QUERY");
        assert_eq!(command_name(0x0100), "UNKNOWN_COMMAND");
    }

    #[test]
    fn empty_payload_message() {
        let msg = Message::new(&QUERY_COMPONENT_STATUS).unwrap();
        assert_eq!(msg.size(), HEADER_SIZE);
        let mut buf = [0u8; HEADER_SIZE];
        assert_eq!(msg.encode_native(&mut buf, 0).unwrap(), HEADER_SIZE);
        assert_eq!(
            Message::decode_native(&QUERY_COMPONENT_STATUS, &buf, 0).unwrap(),
            msg
        );
    }

    #[test]
    fn confirm_service_connection_rate() {
        let mut msg = Message::new(&CONFIRM_SERVICE_CONNECTION).unwrap();
        let q = msg.set_real(2, 546.0).unwrap();
        assert!(!q.clamped);
        assert_eq!(q.value.as_i64(), 32768);
        assert!((msg.real(2).unwrap() - 546.0).abs() <= 1092.0 / 65535.0);
    }

    #[test]
    fn query_velocity_state_fields() {
        let mut msg = Message::new(&QUERY_VELOCITY_STATE).unwrap();
        msg.set_presence_bit(velocity_bits::VELOCITY_X).unwrap();
        msg.set_presence_bit(velocity_bits::TIME_STAMP).unwrap();
        assert_eq!(msg.presence_vector().and_then(|pv| pv.presence_bits()), Some(0x0101));
        assert!(msg.set_presence_bit(16).is_err());
    }
}
