// Code generated by arcmd from ardrone3.xml. DO NOT EDIT.

use arcmd::{ByteBuffer, ClassDef, CmdDef, Command, DecodeError, Decoder, ProjectDef, ToValue, Value};

/// All ARDrone3-only commands
pub const PROJECT_ARDRONE3: ProjectDef = 1;

/// All commands related to piloting the drone
pub const CLASS_PILOTING: ClassDef = 0;

/// title : Take off
/// desc : Ask the drone to take off.
pub const CMD_TAKE_OFF: CmdDef = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ardrone3PilotingTakeOff(pub Command);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ardrone3PilotingTakeOffArguments {}

impl Ardrone3PilotingTakeOff {
    pub fn decode(&self, _b: &[u8]) -> Result<Ardrone3PilotingTakeOffArguments, DecodeError> {
        Ok(Ardrone3PilotingTakeOffArguments {})
    }
}

impl ToValue for Ardrone3PilotingTakeOffArguments {
    fn to_value(&self) -> Value {
        Value::Object("Ardrone3PilotingTakeOff".to_owned(), vec![])
    }
}

impl Decoder for Ardrone3PilotingTakeOff {
    fn command(&self) -> Command {
        self.0
    }

    fn name(&self) -> &'static str {
        "Ardrone3PilotingTakeOff"
    }

    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        Ok(self.decode(payload)?.to_value())
    }
}

pub static PILOTING_TAKE_OFF: Ardrone3PilotingTakeOff = Ardrone3PilotingTakeOff(Command {
    project: PROJECT_ARDRONE3,
    class:   CLASS_PILOTING,
    cmd:     CMD_TAKE_OFF,
});

/// title : Move the drone
/// desc : The libARController is sending the command each 50ms.
pub const CMD_PCMD: CmdDef = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ardrone3PilotingPCMD(pub Command);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ardrone3PilotingPCMDArguments {
    /// Boolean flag: 1 if the roll and pitch values should be taken in consideration. 0 otherwise
    pub flag: u8,
    /// Roll angle as signed percentage.
    pub roll: i8,
    /// Pitch angle as signed percentage.
    pub pitch: i8,
    /// Yaw rotation speed as signed percentage.
    pub yaw: i8,
    /// Throttle as signed percentage.
    pub gaz: i8,
    /// Command timestamp in milliseconds (low 24 bits) + command sequence number (high 8 bits) [0;255].
    pub timestamp_and_seq_num: u32,
}

impl Ardrone3PilotingPCMD {
    pub fn decode(&self, b: &[u8]) -> Result<Ardrone3PilotingPCMDArguments, DecodeError> {
        let mut bb = ByteBuffer::new(b);
        Ok(Ardrone3PilotingPCMDArguments {
            flag: bb.read_u8()?,
            roll: bb.read_i8()?,
            pitch: bb.read_i8()?,
            yaw: bb.read_i8()?,
            gaz: bb.read_i8()?,
            timestamp_and_seq_num: bb.read_u32()?,
        })
    }
}

impl ToValue for Ardrone3PilotingPCMDArguments {
    fn to_value(&self) -> Value {
        Value::Object(
            "Ardrone3PilotingPCMD".to_owned(),
            vec![
                ("flag".to_owned(), Value::U8(self.flag)),
                ("roll".to_owned(), Value::I8(self.roll)),
                ("pitch".to_owned(), Value::I8(self.pitch)),
                ("yaw".to_owned(), Value::I8(self.yaw)),
                ("gaz".to_owned(), Value::I8(self.gaz)),
                ("timestamp_and_seq_num".to_owned(), Value::U32(self.timestamp_and_seq_num)),
            ],
        )
    }
}

impl Decoder for Ardrone3PilotingPCMD {
    fn command(&self) -> Command {
        self.0
    }

    fn name(&self) -> &'static str {
        "Ardrone3PilotingPCMD"
    }

    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        Ok(self.decode(payload)?.to_value())
    }
}

pub static PILOTING_PCMD: Ardrone3PilotingPCMD = Ardrone3PilotingPCMD(Command {
    project: PROJECT_ARDRONE3,
    class:   CLASS_PILOTING,
    cmd:     CMD_PCMD,
});

/// State from drone
pub const CLASS_PILOTING_STATE: ClassDef = 4;

/// title : Alert state
pub const CMD_ALERT_STATE_CHANGED: CmdDef = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ardrone3PilotingStateAlertStateChanged(pub Command);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ardrone3PilotingStateAlertStateChangedArguments {
    /// Drone alert state
    pub state: u32,
}

impl Ardrone3PilotingStateAlertStateChanged {
    pub fn decode(&self, b: &[u8]) -> Result<Ardrone3PilotingStateAlertStateChangedArguments, DecodeError> {
        let mut bb = ByteBuffer::new(b);
        Ok(Ardrone3PilotingStateAlertStateChangedArguments {
            state: bb.read_u32()?,
        })
    }
}

impl ToValue for Ardrone3PilotingStateAlertStateChangedArguments {
    fn to_value(&self) -> Value {
        Value::Object(
            "Ardrone3PilotingStateAlertStateChanged".to_owned(),
            vec![
                ("state".to_owned(), Value::U32(self.state)),
            ],
        )
    }
}

impl Decoder for Ardrone3PilotingStateAlertStateChanged {
    fn command(&self) -> Command {
        self.0
    }

    fn name(&self) -> &'static str {
        "Ardrone3PilotingStateAlertStateChanged"
    }

    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        Ok(self.decode(payload)?.to_value())
    }
}

pub static PILOTING_STATE_ALERT_STATE_CHANGED: Ardrone3PilotingStateAlertStateChanged = Ardrone3PilotingStateAlertStateChanged(Command {
    project: PROJECT_ARDRONE3,
    class:   CLASS_PILOTING_STATE,
    cmd:     CMD_ALERT_STATE_CHANGED,
});

/// Settings state from product
pub const CLASS_SETTINGS_STATE: ClassDef = 16;

/// title : Product name changed
pub const CMD_PRODUCT_NAME_CHANGED: CmdDef = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ardrone3SettingsStateProductNameChanged(pub Command);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ardrone3SettingsStateProductNameChangedArguments {
    /// Product name
    pub name: String,
    /// Current altitude max in m
    pub maxaltitude: f32,
}

impl Ardrone3SettingsStateProductNameChanged {
    pub fn decode(&self, b: &[u8]) -> Result<Ardrone3SettingsStateProductNameChangedArguments, DecodeError> {
        let mut bb = ByteBuffer::new(b);
        Ok(Ardrone3SettingsStateProductNameChangedArguments {
            name: bb.read_string()?,
            maxaltitude: bb.read_f32()?,
        })
    }
}

impl ToValue for Ardrone3SettingsStateProductNameChangedArguments {
    fn to_value(&self) -> Value {
        Value::Object(
            "Ardrone3SettingsStateProductNameChanged".to_owned(),
            vec![
                ("name".to_owned(), Value::String(self.name.clone())),
                ("maxaltitude".to_owned(), Value::Float(self.maxaltitude)),
            ],
        )
    }
}

impl Decoder for Ardrone3SettingsStateProductNameChanged {
    fn command(&self) -> Command {
        self.0
    }

    fn name(&self) -> &'static str {
        "Ardrone3SettingsStateProductNameChanged"
    }

    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        Ok(self.decode(payload)?.to_value())
    }
}

pub static SETTINGS_STATE_PRODUCT_NAME_CHANGED: Ardrone3SettingsStateProductNameChanged = Ardrone3SettingsStateProductNameChanged(Command {
    project: PROJECT_ARDRONE3,
    class:   CLASS_SETTINGS_STATE,
    cmd:     CMD_PRODUCT_NAME_CHANGED,
});

/// Every command above, in schema order.
pub static COMMAND_MAP: &[&dyn Decoder] = &[
    &PILOTING_TAKE_OFF,
    &PILOTING_PCMD,
    &PILOTING_STATE_ALERT_STATE_CHANGED,
    &SETTINGS_STATE_PRODUCT_NAME_CHANGED,
];

pub fn decode_frame(frame: &[u8]) -> Result<Value, DecodeError> {
    arcmd::decode_frame(COMMAND_MAP, frame)
}
