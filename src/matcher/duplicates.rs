//! 複文パターンの重複検出
//!
//! 先頭の文の全出現をgo-deeper検索で集め、各出現位置から囲みの
//! 文リストを順にたどって残りのパターン文を照合する。束縛は文から
//! 文へ引き継がれ、前の文が束縛した変数は後の文でも同じ束縛に
//! マッチしなければならない。

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::MatchError;
use crate::oracle::{ElementId, SymbolOracle, TypeId};
use crate::tree::{enclosing_statements, NodePath};

use super::engine::{same_kind, Stop, TreeMatcher};
use super::state::{BindState, VariableAssignments};
use super::{Cancel, Matches, SearchOptions};

/// パターン文列をスコープと照合し、位置→束縛の挿入順マップを返す。
#[allow(clippy::too_many_arguments)]
pub(crate) fn compute_duplicates(
    patterns: &[NodePath],
    scope: &NodePath,
    oracle: &dyn SymbolOracle,
    cancel: &dyn Cancel,
    options: SearchOptions,
    preinitialized: Option<&BindState>,
    remap_candidates: Option<&HashSet<ElementId>>,
    type_constraints: &HashMap<String, TypeId>,
) -> Result<Matches, MatchError> {
    let Some(first) = patterns.first() else {
        return Ok(Matches::default());
    };

    if !options.allow_go_deeper && !same_kind(scope.leaf(), first.leaf()) {
        return Ok(Matches::default());
    }

    log::debug!("{}文のパターンを検索", patterns.len());

    let mut finder = TreeMatcher::new(first.clone(), oracle, cancel, options, type_constraints);

    finder.allow_go_deeper = options.allow_go_deeper;
    finder.variables_with_allowed_remap = remap_candidates.cloned().unwrap_or_default();
    finder.allow_variables_remap = remap_candidates.is_some();
    finder.nocheck_on_allow_variables_remap = remap_candidates.is_some();

    if let Some(state) = preinitialized {
        finder.preinitialize_state = state.clone();
        finder.bind_state = BindState::start_from(state);
    }

    let first_mapping: IndexMap<NodePath, VariableAssignments> = if options.allow_go_deeper {
        finder.scan_path(scope, None);
        std::mem::take(&mut finder.occurrences)
    } else if finder.scan_path(scope, Some(first)) {
        let mut mapping = IndexMap::new();
        mapping.insert(
            scope.clone(),
            VariableAssignments::snapshot(&finder.bind_state),
        );
        mapping
    } else {
        IndexMap::new()
    };

    match finder.stop.take() {
        Some(Stop::Cancelled) => {
            return Ok(Matches {
                occurrences: if patterns.len() == 1 {
                    first_mapping
                } else {
                    IndexMap::new()
                },
                cancelled: true,
            });
        }
        Some(Stop::UnsupportedPattern(message)) => {
            return Err(MatchError::UnsupportedPatternShape(message));
        }
        None => {}
    }

    let statement = first.leaf().is_statement();
    debug_assert!(statement || patterns.len() == 1);

    if !statement {
        return Ok(Matches {
            occurrences: first_mapping,
            cancelled: false,
        });
    }

    let mut result = IndexMap::new();

    'outer: for (first_occurrence, assignments) in &first_mapping {
        let (parent, statements) = enclosing_statements(first_occurrence);

        let Some(occurrence_index) = statements
            .iter()
            .position(|s| Rc::ptr_eq(s, first_occurrence.leaf()))
        else {
            continue;
        };

        // 残りの文が足りない位置は捨てる
        if occurrence_index + patterns.len() > statements.len() {
            continue;
        }

        let mut variables = assignments.variables.clone();
        let mut multi_variables = assignments.multi_variables.clone();
        let mut variables_to_names = assignments.variables_to_names.clone();
        let mut remap_to_element = assignments.remap_to_element.clone();
        let mut remap_to_trees = assignments.remap_to_trees.clone();

        let mut current_index = occurrence_index;

        for pattern in &patterns[1..] {
            current_index += 1;

            let mut verifier =
                TreeMatcher::new(pattern.clone(), oracle, cancel, options, type_constraints);

            verifier.allow_go_deeper = false;
            verifier.variables_with_allowed_remap =
                remap_candidates.cloned().unwrap_or_default();
            verifier.allow_variables_remap = remap_candidates.is_some();
            verifier.nocheck_on_allow_variables_remap = remap_candidates.is_some();
            verifier.bind_state = BindState::from_parts(
                variables.clone(),
                multi_variables.clone(),
                variables_to_names.clone(),
            );

            if verifier.allow_variables_remap {
                verifier.bind_state = BindState::with_remap(
                    &verifier.bind_state,
                    remap_to_element.clone(),
                    remap_to_trees.clone(),
                );
            }

            let statement_path = match &parent {
                Some(parent) => NodePath::child(parent, statements[current_index].clone()),
                None => NodePath::root(statements[current_index].clone()),
            };

            if !verifier.scan_path(&statement_path, Some(pattern)) {
                match verifier.stop.take() {
                    Some(Stop::Cancelled) => {
                        return Ok(Matches {
                            occurrences: result,
                            cancelled: true,
                        });
                    }
                    Some(Stop::UnsupportedPattern(message)) => {
                        return Err(MatchError::UnsupportedPatternShape(message));
                    }
                    None => {}
                }
                continue 'outer;
            }

            variables = verifier.bind_state.variables;
            multi_variables = verifier.bind_state.multi_variables;
            variables_to_names = verifier.bind_state.variables_to_names;
            remap_to_element = verifier.bind_state.remap_to_element;
            remap_to_trees = verifier.bind_state.remap_to_trees;
        }

        result.insert(
            first_occurrence.clone(),
            VariableAssignments {
                variables,
                multi_variables,
                variables_to_names,
                remap_to_element,
                remap_to_trees,
            },
        );
    }

    Ok(Matches {
        occurrences: result,
        cancelled: false,
    })
}
