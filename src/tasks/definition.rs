use serde::{Deserialize, Serialize};

use crate::platform::{PlatformBundle, PlatformValue};

/// A single entry of the task file
///
/// Every field is optional at parse time; a missing command only shows up when
/// the task is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub cmd: Option<PlatformValue<String>>,
    pub args: Option<PlatformValue<Vec<String>>>,
    pub shell_options: Option<ShellOptions>,
    #[serde(default)]
    pub steal_focus: bool,
}

/// Shell selection: the `default`/`windows`/`mac`/`linux` keys pick the shell,
/// `args` its arguments.
///
/// Also used for the `defaultShell` setting, which has the same layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShellOptions {
    #[serde(flatten)]
    pub shell: PlatformBundle<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<PlatformValue<Vec<String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_definition() {
        let definition: TaskDefinition = serde_json::from_str(
            r#"{
                "cmd": {"default": "make", "windows": "nmake"},
                "args": ["all"],
                "shellOptions": {
                    "default": "bash",
                    "windows": "powershell.exe",
                    "args": {"default": ["-l"], "windows": ["-NoLogo"]}
                },
                "stealFocus": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            definition.cmd,
            Some(PlatformValue::Bundle(PlatformBundle {
                default: Some("make".to_string()),
                windows: Some("nmake".to_string()),
                ..PlatformBundle::default()
            }))
        );
        assert_eq!(
            definition.args,
            Some(PlatformValue::Value(vec!["all".to_string()]))
        );
        let shell_options = definition.shell_options.unwrap();
        assert_eq!(shell_options.shell.default.as_deref(), Some("bash"));
        assert_eq!(
            shell_options.shell.windows.as_deref(),
            Some("powershell.exe")
        );
        assert!(matches!(
            shell_options.args,
            Some(PlatformValue::Bundle(_))
        ));
        assert!(definition.steal_focus);
    }

    #[test]
    fn test_missing_fields_are_accepted() {
        let definition: TaskDefinition = serde_json::from_str("{}").unwrap();
        assert_eq!(definition, TaskDefinition::default());
        assert!(!definition.steal_focus);
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        let result = serde_json::from_str::<TaskDefinition>(r#"{"cmd": 42}"#);
        assert!(result.is_err());
    }
}
