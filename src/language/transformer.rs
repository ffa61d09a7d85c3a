//! Suffix-rule deinflection engine in the style of yomitan's `LanguageTransformer`.
//!
//! A descriptor names a set of conditions (`v1`, `adj-i`, `-ます`, ...) and a
//! list of transforms, each holding suffix rules. [`LanguageTransformer::transform`]
//! breadth-first applies every rule whose input conditions match, recording the
//! path taken as a [`Trace`].

use std::collections::HashSet;

use indexmap::IndexMap;

/// Flags are combined with `|`; `0` means "no constraint".
pub type ConditionFlags = u32;

const MAX_FLAG_LIMIT: usize = 32;

pub struct Condition {
    pub name: &'static str,
    pub is_dictionary_form: bool,
    pub sub_conditions: &'static [&'static str],
}

pub struct SuffixRule {
    pub inflected: String,
    pub deinflected: String,
    pub conditions_in: Vec<&'static str>,
    pub conditions_out: Vec<&'static str>,
}

pub fn suffix_inflection(
    inflected: impl Into<String>,
    deinflected: impl Into<String>,
    conditions_in: &[&'static str],
    conditions_out: &[&'static str],
) -> SuffixRule {
    SuffixRule {
        inflected: inflected.into(),
        deinflected: deinflected.into(),
        conditions_in: conditions_in.to_vec(),
        conditions_out: conditions_out.to_vec(),
    }
}

pub struct Transform {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub rules: Vec<SuffixRule>,
}

pub struct LanguageTransformDescriptor {
    pub language: &'static str,
    pub conditions: Vec<(&'static str, Condition)>,
    pub transforms: Vec<Transform>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error("transform `{transform}` rule[{index}] names unknown condition `{condition}`")]
    Missing {
        transform: &'static str,
        index: usize,
        condition: String,
    },
    #[error("more than {MAX_FLAG_LIMIT} base conditions")]
    MaxConditions,
    #[error("sub-condition cycle between: {conditions}")]
    SubRuleCycle { conditions: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub transform: &'static str,
    pub rule_index: usize,
    /// Text the rule was applied to.
    pub text: String,
}

/// Innermost (closest to the dictionary form) frame first.
pub type Trace = Vec<TraceFrame>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedText {
    pub text: String,
    pub conditions: ConditionFlags,
    pub trace: Trace,
}

struct InternalRule {
    inflected: String,
    deinflected: String,
    conditions_in: ConditionFlags,
    conditions_out: ConditionFlags,
}

impl InternalRule {
    fn deinflect(&self, text: &str) -> String {
        let base = &text[..text.len() - self.inflected.len()];
        format!("{base}{}", self.deinflected)
    }
}

struct InternalTransform {
    name: &'static str,
    rules: Vec<InternalRule>,
    /// Last character of every inflected suffix; cheap pre-filter before the rules.
    heuristic: HashSet<char>,
}

impl InternalTransform {
    fn may_apply(&self, text: &str) -> bool {
        text.chars()
            .next_back()
            .is_some_and(|c| self.heuristic.contains(&c))
    }
}

pub struct LanguageTransformer {
    transforms: Vec<InternalTransform>,
    condition_type_to_condition_flags_map: IndexMap<&'static str, ConditionFlags>,
    part_of_speech_to_condition_flags_map: IndexMap<&'static str, ConditionFlags>,
    max_results: usize,
}

impl LanguageTransformer {
    pub fn new(
        descriptor: &LanguageTransformDescriptor,
        max_results: usize,
    ) -> Result<Self, ConditionError> {
        let flags_map = Self::get_condition_flags_map(&descriptor.conditions)?;

        let mut transforms = Vec::with_capacity(descriptor.transforms.len());
        for transform in &descriptor.transforms {
            let mut rules = Vec::with_capacity(transform.rules.len());
            let mut heuristic = HashSet::new();
            for (index, rule) in transform.rules.iter().enumerate() {
                let strict = |conditions: &[&'static str]| {
                    Self::get_condition_flags_strict(&flags_map, conditions).map_err(|condition| {
                        ConditionError::Missing {
                            transform: transform.name,
                            index,
                            condition,
                        }
                    })
                };
                if let Some(last) = rule.inflected.chars().next_back() {
                    heuristic.insert(last);
                }
                rules.push(InternalRule {
                    inflected: rule.inflected.clone(),
                    deinflected: rule.deinflected.clone(),
                    conditions_in: strict(rule.conditions_in.as_slice())?,
                    conditions_out: strict(rule.conditions_out.as_slice())?,
                });
            }
            transforms.push(InternalTransform {
                name: transform.name,
                rules,
                heuristic,
            });
        }

        let part_of_speech_to_condition_flags_map = descriptor
            .conditions
            .iter()
            .filter(|(_, condition)| condition.is_dictionary_form)
            .filter_map(|(id, _)| flags_map.get(*id).map(|flags| (*id, *flags)))
            .collect();

        Ok(Self {
            transforms,
            condition_type_to_condition_flags_map: flags_map,
            part_of_speech_to_condition_flags_map,
            max_results,
        })
    }

    /// Every deinflection reachable from `source`, starting with `source` itself
    /// (conditions `0`, empty trace).
    pub fn transform(&self, source: &str) -> Vec<TransformedText> {
        let mut results = vec![TransformedText {
            text: source.to_string(),
            conditions: 0,
            trace: Vec::new(),
        }];

        let mut i = 0;
        while i < results.len() {
            let TransformedText {
                text,
                conditions,
                trace,
            } = results[i].clone();

            for transform in &self.transforms {
                if !transform.may_apply(&text) {
                    continue;
                }
                for (rule_index, rule) in transform.rules.iter().enumerate() {
                    if !Self::conditions_match(conditions, rule.conditions_in)
                        || !text.ends_with(&rule.inflected)
                    {
                        continue;
                    }
                    let is_cycle = trace.iter().any(|frame| {
                        frame.transform == transform.name
                            && frame.rule_index == rule_index
                            && frame.text == text
                    });
                    if is_cycle {
                        log::debug!(
                            "cycle detected in transform[{}] rule[{rule_index}] for text: {text}",
                            transform.name
                        );
                        continue;
                    }
                    if results.len() >= self.max_results {
                        log::warn!(
                            "deinflection of `{source}` stopped after {} candidates",
                            self.max_results
                        );
                        return results;
                    }
                    results.push(TransformedText {
                        text: rule.deinflect(&text),
                        conditions: rule.conditions_out,
                        trace: Self::extend_trace(
                            &trace,
                            TraceFrame {
                                transform: transform.name,
                                rule_index,
                                text: text.clone(),
                            },
                        ),
                    });
                }
            }
            i += 1;
        }
        results
    }

    fn extend_trace(trace: &[TraceFrame], new_frame: TraceFrame) -> Trace {
        let mut new_trace = Vec::with_capacity(trace.len() + 1);
        new_trace.push(new_frame);
        new_trace.extend_from_slice(trace);
        new_trace
    }

    /// If `current_conditions` is `0`, then `next_conditions` is ignored and `true` is returned.
    /// Otherwise, there must be at least one shared condition between the two.
    pub fn conditions_match(current_conditions: ConditionFlags, next_conditions: ConditionFlags) -> bool {
        current_conditions == 0 || (current_conditions & next_conditions) != 0
    }

    pub fn get_condition_flags_from_condition_types(&self, condition_types: &[&str]) -> ConditionFlags {
        Self::get_condition_flags(&self.condition_type_to_condition_flags_map, condition_types)
    }

    pub fn get_condition_flags_from_parts_of_speech(&self, parts_of_speech: &[&str]) -> ConditionFlags {
        Self::get_condition_flags(&self.part_of_speech_to_condition_flags_map, parts_of_speech)
    }

    fn get_condition_flags(
        map: &IndexMap<&'static str, ConditionFlags>,
        condition_types: &[&str],
    ) -> ConditionFlags {
        condition_types
            .iter()
            .filter_map(|condition_type| map.get(*condition_type))
            .fold(0, |flags, flag| flags | flag)
    }

    fn get_condition_flags_strict(
        map: &IndexMap<&'static str, ConditionFlags>,
        condition_types: &[&'static str],
    ) -> Result<ConditionFlags, String> {
        let mut flags = 0;
        for condition_type in condition_types {
            let Some(flag) = map.get(*condition_type) else {
                return Err(condition_type.to_string());
            };
            flags |= flag;
        }
        Ok(flags)
    }

    /// Base conditions get one bit each; conditions with sub-conditions get the
    /// union of their children's bits, resolved in as many passes as needed.
    fn get_condition_flags_map(
        conditions: &[(&'static str, Condition)],
    ) -> Result<IndexMap<&'static str, ConditionFlags>, ConditionError> {
        let mut map = IndexMap::with_capacity(conditions.len());
        let mut next_flag_index = 0;
        let mut targets: Vec<&(&'static str, Condition)> = conditions.iter().collect();

        while !targets.is_empty() {
            let targets_len = targets.len();
            let mut next_targets = Vec::with_capacity(targets_len);
            for target in targets {
                let (id, condition) = target;
                if condition.sub_conditions.is_empty() {
                    if next_flag_index >= MAX_FLAG_LIMIT {
                        return Err(ConditionError::MaxConditions);
                    }
                    map.insert(*id, 1 << next_flag_index);
                    next_flag_index += 1;
                    continue;
                }
                match Self::get_condition_flags_strict(&map, condition.sub_conditions) {
                    Ok(flags) => {
                        map.insert(*id, flags);
                    }
                    Err(_) => next_targets.push(target),
                }
            }
            if next_targets.len() == targets_len {
                let conditions = next_targets
                    .iter()
                    .map(|(id, _)| *id)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(ConditionError::SubRuleCycle { conditions });
            }
            targets = next_targets;
        }
        Ok(map)
    }
}
