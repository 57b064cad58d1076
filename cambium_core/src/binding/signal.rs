// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed signal dispatch for binding activation.
//!
//! Bindings name signals as strings; each activatable type registers a
//! [`SignalTable`] describing its action signals so arguments can be
//! checked and converted before emission.

use std::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// An argument stored in a binding entry.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingArg {
    /// An integer literal.
    Long(i64),
    /// A float literal.
    Double(f64),
    /// A quoted string.
    Str(Box<str>),
    /// A bare identifier; resolves against enum/flags parameter types.
    Ident(Box<str>),
}

/// One signal emission stored in a binding entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalCall {
    /// The signal to emit.
    pub signal_name: Box<str>,
    /// Arguments, converted per the signal's parameter types at emission.
    pub args: SmallVec<[BindingArg; 3]>,
}

/// A named value of a registered enum class.
#[derive(Debug)]
pub struct EnumMember {
    /// The full value name (e.g. `MOVE_WORDS`).
    pub name: &'static str,
    /// The short nickname (e.g. `words`).
    pub nick: &'static str,
    /// The numeric value.
    pub value: i64,
}

/// An enum type identifiers can resolve against.
#[derive(Debug)]
pub struct EnumClass {
    /// The type's name.
    pub name: &'static str,
    /// Its members.
    pub members: &'static [EnumMember],
}

impl EnumClass {
    /// Resolves an identifier by name, then by nick.
    pub fn by_name_or_nick(&self, ident: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|m| m.name == ident)
            .or_else(|| self.members.iter().find(|m| m.nick == ident))
            .map(|m| m.value)
    }
}

/// A named bit of a registered flags class.
#[derive(Debug)]
pub struct FlagsMember {
    /// The full value name.
    pub name: &'static str,
    /// The short nickname.
    pub nick: &'static str,
    /// The bit value.
    pub value: u32,
}

/// A flags type identifiers can resolve against.
#[derive(Debug)]
pub struct FlagsClass {
    /// The type's name.
    pub name: &'static str,
    /// Its members.
    pub members: &'static [FlagsMember],
}

impl FlagsClass {
    /// Resolves an identifier by name, then by nick.
    pub fn by_name_or_nick(&self, ident: &str) -> Option<u32> {
        self.members
            .iter()
            .find(|m| m.name == ident)
            .or_else(|| self.members.iter().find(|m| m.nick == ident))
            .map(|m| m.value)
    }
}

/// A signal parameter's declared type.
#[derive(Clone, Copy, Debug)]
pub enum ParamKind {
    /// A signed integer.
    Long,
    /// A float.
    Double,
    /// A boolean.
    Bool,
    /// A string.
    Str,
    /// A value of the given enum class.
    Enum(&'static EnumClass),
    /// A combination of the given flags class.
    Flags(&'static FlagsClass),
}

/// A concrete argument passed to a signal handler.
#[derive(Clone, Debug, PartialEq)]
pub enum SignalValue {
    /// A signed integer.
    Long(i64),
    /// A float.
    Double(f64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Str(Box<str>),
    /// An enum value.
    Enum(i64),
    /// A flags combination.
    Flags(u32),
}

/// A signal's declared return type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnKind {
    /// No return value; emission counts as handled.
    Void,
    /// Boolean; `true` counts as handled.
    Bool,
}

/// The declared shape of one signal.
#[derive(Debug)]
pub struct SignalSpec {
    /// Parameter types, in order.
    pub params: SmallVec<[ParamKind; 3]>,
    /// Return type.
    pub return_kind: ReturnKind,
    /// Whether the signal may be emitted from a key binding.
    pub action: bool,
}

impl SignalSpec {
    /// An action signal with the given parameters.
    pub fn action(params: impl IntoIterator<Item = ParamKind>, return_kind: ReturnKind) -> Self {
        Self {
            params: params.into_iter().collect(),
            return_kind,
            action: true,
        }
    }

    /// A signal that bindings may not emit.
    pub fn non_action(
        params: impl IntoIterator<Item = ParamKind>,
        return_kind: ReturnKind,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            return_kind,
            action: false,
        }
    }
}

/// The signals one activatable type declares.
#[derive(Default)]
pub struct SignalTable {
    signals: HashMap<&'static str, SignalSpec>,
}

impl fmt::Debug for SignalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalTable")
            .field("n_signals", &self.signals.len())
            .finish()
    }
}

impl SignalTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a signal; replaces any previous spec under the name.
    pub fn register(&mut self, name: &'static str, spec: SignalSpec) {
        self.signals.insert(name, spec);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: &'static str, spec: SignalSpec) -> Self {
        self.register(name, spec);
        self
    }

    /// Looks a signal up by name.
    pub fn lookup(&self, name: &str) -> Option<&SignalSpec> {
        self.signals.get(name)
    }
}

/// Converts one stored argument to a declared parameter type.
///
/// Identifiers resolve against enum and flags classes by name then nick;
/// numbers convert within the numeric kinds; everything else must match.
pub fn transform_arg(arg: &BindingArg, kind: ParamKind) -> Option<SignalValue> {
    match (arg, kind) {
        (BindingArg::Long(v), ParamKind::Long) => Some(SignalValue::Long(*v)),
        (BindingArg::Long(v), ParamKind::Double) => Some(SignalValue::Double(*v as f64)),
        (BindingArg::Long(v), ParamKind::Bool) => Some(SignalValue::Bool(*v != 0)),
        (BindingArg::Long(v), ParamKind::Enum(_)) => Some(SignalValue::Enum(*v)),
        (BindingArg::Long(v), ParamKind::Flags(_)) => Some(SignalValue::Flags(*v as u32)),
        (BindingArg::Double(v), ParamKind::Double) => Some(SignalValue::Double(*v)),
        (BindingArg::Double(v), ParamKind::Long) => Some(SignalValue::Long(v.round() as i64)),
        (BindingArg::Str(s), ParamKind::Str) | (BindingArg::Ident(s), ParamKind::Str) => {
            Some(SignalValue::Str(s.clone()))
        }
        (BindingArg::Ident(s), ParamKind::Enum(class)) => {
            class.by_name_or_nick(s).map(SignalValue::Enum)
        }
        (BindingArg::Ident(s), ParamKind::Flags(class)) => {
            class.by_name_or_nick(s).map(SignalValue::Flags)
        }
        _ => None,
    }
}

/// Converts all arguments of a call; `None` if any conversion fails.
pub fn compose_params(args: &[BindingArg], spec: &SignalSpec) -> Option<Vec<SignalValue>> {
    debug_assert_eq!(args.len(), spec.params.len(), "arity checked by caller");
    args.iter()
        .zip(spec.params.iter())
        .map(|(arg, kind)| transform_arg(arg, *kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    static DIRECTION: EnumClass = EnumClass {
        name: "Direction",
        members: &[
            EnumMember {
                name: "DIRECTION_FORWARD",
                nick: "forward",
                value: 0,
            },
            EnumMember {
                name: "DIRECTION_BACKWARD",
                nick: "backward",
                value: 1,
            },
        ],
    };

    #[test]
    fn ident_resolves_by_name_then_nick() {
        let by_name = transform_arg(
            &BindingArg::Ident("DIRECTION_BACKWARD".into()),
            ParamKind::Enum(&DIRECTION),
        );
        assert_eq!(by_name, Some(SignalValue::Enum(1)));

        let by_nick = transform_arg(
            &BindingArg::Ident("forward".into()),
            ParamKind::Enum(&DIRECTION),
        );
        assert_eq!(by_nick, Some(SignalValue::Enum(0)));

        let missing = transform_arg(
            &BindingArg::Ident("sideways".into()),
            ParamKind::Enum(&DIRECTION),
        );
        assert_eq!(missing, None);
    }

    #[test]
    fn plain_strings_do_not_resolve_enums() {
        let result = transform_arg(
            &BindingArg::Str("forward".into()),
            ParamKind::Enum(&DIRECTION),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(
            transform_arg(&BindingArg::Long(3), ParamKind::Double),
            Some(SignalValue::Double(3.0))
        );
        assert_eq!(
            transform_arg(&BindingArg::Long(0), ParamKind::Bool),
            Some(SignalValue::Bool(false))
        );
        assert_eq!(
            transform_arg(&BindingArg::Double(2.6), ParamKind::Long),
            Some(SignalValue::Long(3))
        );
        assert_eq!(transform_arg(&BindingArg::Long(1), ParamKind::Str), None);
    }

    #[test]
    fn compose_fails_atomically() {
        let spec = SignalSpec::action([ParamKind::Long, ParamKind::Enum(&DIRECTION)], ReturnKind::Void);
        let good = compose_params(
            &[BindingArg::Long(5), BindingArg::Ident("forward".into())],
            &spec,
        );
        assert_eq!(
            good,
            Some(vec![SignalValue::Long(5), SignalValue::Enum(0)])
        );

        let bad = compose_params(
            &[BindingArg::Long(5), BindingArg::Ident("bogus".into())],
            &spec,
        );
        assert_eq!(bad, None);
    }
}
