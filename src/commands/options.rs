//! Option listing, get and set commands

use super::parse_option_value;
use rsane_core::option::{Capabilities, OptionDescriptor, SetInfo, Unit, ValueType};
use rsane_core::Session;

fn describe_unit(unit: Unit) -> String {
    match unit {
        Unit::None => String::new(),
        other => format!(" {}", other),
    }
}

/// A trigger the client fires, such as a calibration, rather than a button
fn is_action(desc: &OptionDescriptor) -> bool {
    desc.value_type == ValueType::Trigger && desc.capabilities.contains(Capabilities::SOFT_SELECT)
}

fn print_option(session: &mut Session<'_>, desc: &OptionDescriptor) {
    let value = if !desc.is_active() {
        "[inactive]".to_string()
    } else if is_action(desc) {
        "[action]".to_string()
    } else {
        match session.get_value(&desc.name) {
            Ok(value) => format!("{}{}", value, describe_unit(desc.unit)),
            Err(e) => format!("[error: {}]", e),
        }
    };

    let constraint = desc.constraint.to_string();
    let mut flags = Vec::new();
    if !desc.is_settable() && !is_action(desc) {
        flags.push("read-only");
    }
    if desc.capabilities.contains(Capabilities::ADVANCED) {
        flags.push("advanced");
    }
    if desc.capabilities.contains(Capabilities::AUTOMATIC) {
        flags.push("auto");
    }

    print!("    --{} <{}>", desc.name, desc.value_type);
    if !constraint.is_empty() {
        print!(" {}", constraint);
    }
    print!(" = {}", value);
    if !flags.is_empty() {
        print!(" ({})", flags.join(", "));
    }
    println!();
    if !desc.description.is_empty() {
        println!("        {}", desc.description);
    }
}

/// Print the option descriptors of a device, grouped as the device orders them
pub fn cmd_options(session: &mut Session<'_>, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options: Vec<OptionDescriptor> = session
        .options()
        .iter()
        .filter(|d| all || d.is_active())
        .cloned()
        .collect();

    println!("Options for device '{}':", session.device_name());
    let mut group: Option<&str> = None;
    for desc in &options {
        if group != Some(desc.group.as_str()) {
            group = Some(desc.group.as_str());
            let title = if desc.group.is_empty() {
                "General"
            } else {
                desc.group.as_str()
            };
            println!("  {}:", title);
        }
        print_option(session, desc);
    }
    Ok(())
}

/// Print one option value
pub fn cmd_get(session: &mut Session<'_>, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value = session.get_value(name)?;
    println!("{} = {}", name, value);
    Ok(())
}

/// Set one option value and report the side effects
pub fn cmd_set(
    session: &mut Session<'_>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = parse_option_value(session, name, text)?;
    let info = session.set_value(name, value)?;

    if info.contains(SetInfo::INEXACT) {
        println!("Device rounded the value");
    }
    if info.contains(SetInfo::RELOAD_OPTIONS) {
        session.refresh_options()?;
        println!("Option set changed");
    }
    if info.contains(SetInfo::RELOAD_PARAMS) {
        println!("Frame: {}", session.parameters()?);
    }
    println!("{} = {}", name, session.get_value(name)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_action() {
        let calibrate = OptionDescriptor::new("calibrate", ValueType::Trigger);
        assert!(is_action(&calibrate));

        let button = OptionDescriptor::new("scan", ValueType::Trigger)
            .capabilities(Capabilities::SOFT_DETECT | Capabilities::HARD_SELECT);
        assert!(!is_action(&button));

        let resolution = OptionDescriptor::new("resolution", ValueType::Int);
        assert!(!is_action(&resolution));
    }
}
