// example/src/main.rs

mod generated;

use arcmd::*;

// Bring the generated command singletons into scope:
use generated::{PILOTING_PCMD, PILOTING_TAKE_OFF, SETTINGS_STATE_PRODUCT_NAME_CHANGED};

/// Prefixes `payload` with the 4-byte header of `command`.
fn frame(command: Command, payload: ByteBufferMut) -> Vec<u8> {
    let mut bytes = command.header().to_vec();
    bytes.extend(payload.data());
    bytes
}

fn main() -> Result<(), DecodeError> {
    // Build a PCMD payload by hand, in the order the schema declares it.
    let mut pcmd = ByteBufferMut::new();
    pcmd.write_u8(1); // flag
    pcmd.write_i8(-20); // roll
    pcmd.write_i8(35); // pitch
    pcmd.write_i8(0); // yaw
    pcmd.write_i8(50); // gaz
    pcmd.write_u32(0x0700_0100); // timestampAndSeqNum

    // Typed decode through the generated procedure.
    let args = PILOTING_PCMD.decode(&pcmd.data())?;
    println!("PCMD roll = {}, pitch = {}, gaz = {}", args.roll, args.pitch, args.gaz);
    println!("PCMD seq = {}", args.timestamp_and_seq_num >> 24);

    // Dynamic decode of a whole frame through the dispatch table.
    let mut name = ByteBufferMut::new();
    name.write_string("Bebop 2");
    name.write_f32(150.0);
    let bytes = frame(SETTINGS_STATE_PRODUCT_NAME_CHANGED.0, name);

    let value = generated::decode_frame(&bytes)?;
    println!("{:?}", value);
    println!("{}", value_to_json(&value));

    // Zero-argument commands read nothing, whatever follows the header.
    let take_off = frame(PILOTING_TAKE_OFF.0, ByteBufferMut::new());
    println!("{}", decode_to_json(generated::COMMAND_MAP, &take_off)?);

    match generated::decode_frame(&[1, 0, 99, 0]) {
        Err(err) => println!("unknown command: {}", err),
        Ok(value) => println!("unexpected: {:?}", value),
    }

    let summary: Vec<serde_json::Value> = generated::COMMAND_MAP
        .iter()
        .map(|d| serde_json::json!({ "name": d.name(), "command": d.command().to_string() }))
        .collect();
    println!("{}", serde_json::Value::Array(summary));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use generated::{
        Ardrone3PilotingTakeOffArguments, CLASS_PILOTING_STATE, CMD_ALERT_STATE_CHANGED,
        PILOTING_STATE_ALERT_STATE_CHANGED, PROJECT_ARDRONE3,
    };

    #[test]
    fn test_typed_decode_matches_dispatch() {
        let mut payload = ByteBufferMut::new();
        payload.write_string("Bebop 2");
        payload.write_f32(150.0);
        let bytes = frame(SETTINGS_STATE_PRODUCT_NAME_CHANGED.0, payload);

        let typed = SETTINGS_STATE_PRODUCT_NAME_CHANGED.decode(&bytes[HEADER_LEN..]).unwrap();
        assert_eq!(typed.name, "Bebop 2");
        assert_eq!(typed.maxaltitude, 150.0);
        assert_eq!(generated::decode_frame(&bytes).unwrap(), typed.to_value());
    }

    #[test]
    fn test_enum_arguments_decode_as_u32() {
        let bytes = [1, 4, 2, 0, 3, 0, 0, 0];
        let value = generated::decode_frame(&bytes).unwrap();
        assert_eq!(value.get("state"), Some(&Value::U32(3)));
        assert_eq!(
            PILOTING_STATE_ALERT_STATE_CHANGED.0,
            Command::new(PROJECT_ARDRONE3, CLASS_PILOTING_STATE, CMD_ALERT_STATE_CHANGED)
        );
    }

    #[test]
    fn test_short_payload_is_an_error() {
        assert!(PILOTING_PCMD.decode(&[1, 2, 3]).is_err());
        assert_eq!(PILOTING_TAKE_OFF.decode(&[9, 9, 9]), Ok(Ardrone3PilotingTakeOffArguments {}));
    }

    #[tokio::test]
    async fn test_generated_module_is_up_to_date() {
        let schema = include_str!("../schema/ardrone3.xml");
        let expected = compile_schema_to_rust("ardrone3.xml", schema, &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(include_str!("generated.rs"), expected);
    }
}
