//! 重複箇所の診断レンダリング
//!
//! マッチ結果を`codespan-reporting`の診断に変換する。検出器側の
//! UIはこのクレートの範囲外なので、ここでは診断の組み立てまでを
//! 受け持つ。

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::matcher::Matches;

/// マッチ結果全体をひとつの診断にまとめる。
/// 最初の出現をprimary、残りをsecondaryのラベルにする。
pub fn duplicates_diagnostic(matches: &Matches, file_id: usize) -> Option<Diagnostic<usize>> {
    let mut occurrences = matches.iter();
    let (first, _) = occurrences.next()?;
    let first_span = first.leaf().span();

    let mut labels = vec![
        Label::primary(file_id, first_span.start..first_span.end).with_message("最初の出現"),
    ];

    for (path, _) in occurrences {
        let span = path.leaf().span();
        labels.push(
            Label::secondary(file_id, span.start..span.end).with_message("重複した出現"),
        );
    }

    Some(
        Diagnostic::warning()
            .with_message(format!(
                "{}箇所の重複コードが見つかりました",
                matches.len()
            ))
            .with_labels(labels),
    )
}

/// 出現1件ごとに個別の診断を作る。束縛された変数名をnoteに載せる。
pub fn occurrence_diagnostics(matches: &Matches, file_id: usize) -> Vec<Diagnostic<usize>> {
    matches
        .iter()
        .map(|(path, assignments)| {
            let span = path.leaf().span();

            let mut bound: Vec<&str> = assignments
                .variables
                .keys()
                .chain(assignments.multi_variables.keys())
                .map(String::as_str)
                .collect();
            bound.sort_unstable();

            let mut diagnostic = Diagnostic::note()
                .with_message("パターンに一致するコード")
                .with_labels(vec![Label::primary(file_id, span.start..span.end)]);

            if !bound.is_empty() {
                diagnostic =
                    diagnostic.with_notes(vec![format!("束縛された変数: {}", bound.join(", "))]);
            }

            diagnostic
        })
        .collect()
}
