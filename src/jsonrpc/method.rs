/// Methods of the apparatus control protocol. Each carries the numeric code
/// used as the default request id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    // Registration and status
    Register,
    Unregister,
    Ping,
    GetStatus,
    GetNodeStatus,
    GetUserStatus,
    // Configuration
    GetConfig,
    SetConfig,
    // Camera control
    InitCamera,
    GetCameraStatus,
    GetCameraConfig,
    SetCameraConfig,
    GetCameraFrame,
    StartCameraStream,
    StopCameraStream,
    // Motor control
    InitMotor,
    GetMotorStatus,
    GetMotorConfig,
    SetMotorConfig,
    StartMotor,
    StopMotor,
}

impl Method {
    pub fn code(&self) -> i64 {
        match self {
            Method::Register => 1,
            Method::Unregister => 2,
            Method::Ping => 3,
            Method::GetStatus => 5,
            Method::GetNodeStatus => 6,
            Method::GetUserStatus => 7,
            Method::GetConfig => 10,
            Method::SetConfig => 11,
            Method::InitCamera => 20,
            Method::GetCameraStatus => 21,
            Method::GetCameraConfig => 22,
            Method::SetCameraConfig => 23,
            Method::GetCameraFrame => 24,
            Method::StartCameraStream => 25,
            Method::StopCameraStream => 26,
            Method::InitMotor => 30,
            Method::GetMotorStatus => 31,
            Method::GetMotorConfig => 32,
            Method::SetMotorConfig => 33,
            Method::StartMotor => 34,
            Method::StopMotor => 35,
        }
    }

    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Register => "REGISTER",
            Method::Unregister => "UNREGISTER",
            Method::Ping => "PING",
            Method::GetStatus => "GET_STATUS",
            Method::GetNodeStatus => "GET_NODE_STATUS",
            Method::GetUserStatus => "GET_USER_STATUS",
            Method::GetConfig => "GET_CONFIG",
            Method::SetConfig => "SET_CONFIG",
            Method::InitCamera => "INIT_CAMERA",
            Method::GetCameraStatus => "GET_CAMERA_STATUS",
            Method::GetCameraConfig => "GET_CAMERA_CONFIG",
            Method::SetCameraConfig => "SET_CAMERA_CONFIG",
            Method::GetCameraFrame => "GET_CAMERA_FRAME",
            Method::StartCameraStream => "START_CAMERA_STREAM",
            Method::StopCameraStream => "STOP_CAMERA_STREAM",
            Method::InitMotor => "INIT_MOTOR",
            Method::GetMotorStatus => "GET_MOTOR_STATUS",
            Method::GetMotorConfig => "GET_MOTOR_CONFIG",
            Method::SetMotorConfig => "SET_MOTOR_CONFIG",
            Method::StartMotor => "START_MOTOR",
            Method::StopMotor => "STOP_MOTOR",
        }
    }

    pub fn from_name(name: &str) -> Option<Method> {
        const ALL: [Method; 21] = [
            Method::Register,
            Method::Unregister,
            Method::Ping,
            Method::GetStatus,
            Method::GetNodeStatus,
            Method::GetUserStatus,
            Method::GetConfig,
            Method::SetConfig,
            Method::InitCamera,
            Method::GetCameraStatus,
            Method::GetCameraConfig,
            Method::SetCameraConfig,
            Method::GetCameraFrame,
            Method::StartCameraStream,
            Method::StopCameraStream,
            Method::InitMotor,
            Method::GetMotorStatus,
            Method::GetMotorConfig,
            Method::SetMotorConfig,
            Method::StartMotor,
            Method::StopMotor,
        ];
        ALL.into_iter().find(|m| m.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for method in [
            Method::Register,
            Method::Ping,
            Method::SetConfig,
            Method::GetCameraFrame,
            Method::StopMotor,
        ] {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
        assert_eq!(Method::from_name("NO_SUCH_METHOD"), None);
    }

    #[test]
    fn codes_match_protocol_table() {
        assert_eq!(Method::Register.code(), 1);
        assert_eq!(Method::Ping.code(), 3);
        assert_eq!(Method::GetConfig.code(), 10);
        assert_eq!(Method::InitCamera.code(), 20);
        assert_eq!(Method::StopCameraStream.code(), 26);
        assert_eq!(Method::InitMotor.code(), 30);
        assert_eq!(Method::StopMotor.code(), 35);
    }
}
