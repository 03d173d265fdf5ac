use crate::{
    constants::NUM_OF_TERMS_IN_STATEMENT,
    error::RDFProofsError,
    statement::{Statement, Term},
};
use std::collections::HashMap;

/// expand statement indices into the indices of their terms, `i -> [4i, 4i+1, 4i+2, 4i+3]`
pub fn expand_to_term_indices(statement_indices: &[usize]) -> Vec<usize> {
    statement_indices
        .iter()
        .flat_map(|i| {
            (0..NUM_OF_TERMS_IN_STATEMENT).map(move |j| i * NUM_OF_TERMS_IN_STATEMENT + j)
        })
        .collect()
}

/// Locate each revealed statement in the full statement sequence and shift it by `offset`.
///
/// Fails when a revealed statement is absent from the full sequence or when the
/// resolved positions do not account for every revealed statement.
pub fn resolve_revealed_indices(
    full_statements: &[Statement],
    partial_statements: &[Statement],
    offset: usize,
) -> Result<Vec<usize>, RDFProofsError> {
    let positions: HashMap<String, usize> = full_statements
        .iter()
        .enumerate()
        .rev()
        .map(|(i, s)| (s.to_string(), i))
        .collect();

    let indices = partial_statements
        .iter()
        .map(|s| {
            positions
                .get(&s.to_string())
                .map(|i| i + offset)
                .ok_or(RDFProofsError::IndexResolution)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut unique = indices.clone();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() != partial_statements.len() {
        return Err(RDFProofsError::IndexResolution);
    }
    Ok(indices)
}

/// Put terms received in revealed-statement order back into ascending term-index order.
///
/// `statement_indices` is the header sent by the holder; the result is paired with
/// the sorted term indices.
pub fn reorder_terms(
    statement_indices: &[usize],
    statements: &[Statement],
) -> Result<(Vec<usize>, Vec<Term>), RDFProofsError> {
    if statement_indices.len() != statements.len() {
        return Err(RDFProofsError::IndexResolution);
    }
    let mut indexed: Vec<(usize, &Statement)> = statement_indices
        .iter()
        .copied()
        .zip(statements.iter())
        .collect();
    indexed.sort_by_key(|(i, _)| *i);
    if indexed.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(RDFProofsError::IndexResolution);
    }

    let sorted_statement_indices: Vec<usize> = indexed.iter().map(|(i, _)| *i).collect();
    let terms = indexed
        .into_iter()
        .flat_map(|(_, s)| s.terms().map(Term::clone))
        .collect();
    Ok((expand_to_term_indices(&sorted_statement_indices), terms))
}

#[cfg(test)]
mod tests {
    use super::{expand_to_term_indices, reorder_terms, resolve_revealed_indices};
    use crate::{
        error::RDFProofsError,
        statement::{Statement, Term},
    };

    fn statements(lines: &[&str]) -> Vec<Statement> {
        lines.iter().map(|l| Statement::parse(l).unwrap()).collect()
    }

    const FULL: [&str; 4] = [
        r#"<did:example:john> <http://schema.org/name> "John" ."#,
        r#"<did:example:john> <http://schema.org/age> "30"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
        r#"<did:example:john> <http://schema.org/email> "john@example.org" ."#,
        r#"<did:example:john> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> ."#,
    ];

    #[test]
    fn expand_fans_out_four_terms_per_statement() {
        assert_eq!(
            expand_to_term_indices(&[0, 5, 2]),
            vec![0, 1, 2, 3, 20, 21, 22, 23, 8, 9, 10, 11]
        );
        assert!(expand_to_term_indices(&[]).is_empty());
        for indices in [vec![1usize], vec![3, 1, 4, 1, 5], vec![9, 2, 6]] {
            let expanded = expand_to_term_indices(&indices);
            assert_eq!(expanded.len(), 4 * indices.len());
            for (k, i) in indices.iter().enumerate() {
                assert_eq!(&expanded[4 * k..4 * k + 4], &[4 * i, 4 * i + 1, 4 * i + 2, 4 * i + 3]);
            }
        }
    }

    #[test]
    fn resolve_keeps_revealed_order_and_adds_offset() {
        let full = statements(&FULL);
        let partial = statements(&[FULL[3], FULL[1]]);
        assert_eq!(
            resolve_revealed_indices(&full, &partial, 2).unwrap(),
            vec![5, 3]
        );
    }

    #[test]
    fn resolve_fails_for_unsigned_statement() {
        let full = statements(&FULL);
        let partial = statements(&[
            FULL[0],
            r#"<did:example:john> <http://schema.org/name> "Jane" ."#,
        ]);
        assert!(matches!(
            resolve_revealed_indices(&full, &partial, 0),
            Err(RDFProofsError::IndexResolution)
        ));
    }

    #[test]
    fn resolve_fails_for_duplicated_statement() {
        let full = statements(&FULL);
        let partial = statements(&[FULL[0], FULL[0]]);
        assert!(matches!(
            resolve_revealed_indices(&full, &partial, 0),
            Err(RDFProofsError::IndexResolution)
        ));
    }

    #[test]
    fn reorder_sorts_terms_by_statement_index() {
        let revealed = statements(&[FULL[0], FULL[2]]);
        let (term_indices, terms) = reorder_terms(&[7, 3], &revealed).unwrap();
        assert_eq!(term_indices, vec![12, 13, 14, 15, 28, 29, 30, 31]);
        assert_eq!(terms[2], Term::simple_literal("john@example.org"));
        assert_eq!(terms[6].to_string(), "\"John\"");
    }

    #[test]
    fn reorder_rejects_inconsistent_headers() {
        let revealed = statements(&[FULL[0], FULL[2]]);
        assert!(reorder_terms(&[1], &revealed).is_err());
        assert!(reorder_terms(&[1, 1], &revealed).is_err());
    }
}
