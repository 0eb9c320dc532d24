// src/services/reconcile_service.rs

use std::collections::{HashMap, HashSet};

use crate::{
    common::error::AppError,
    models::customer::{CustomerFields, CustomerRecord, EditedRow, ReconcileSummary},
    services::CustomerService,
    validation::{validate_customer, ValidatedCustomer, ValidationReport, Violation, ViolationKind},
};

/// Linha editada que difere do baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRow<'a> {
    pub edited: &'a CustomerRecord,
    pub baseline: &'a CustomerRecord,
    /// Campos (nomes da API) que mudaram.
    pub fields: Vec<&'static str>,
}

/// O delta entre a visão editada e o baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta<'a> {
    pub changed: Vec<ChangedRow<'a>>,
    pub deletes: Vec<i64>,
}

impl Delta<'_> {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deletes.is_empty()
    }
}

/// Calcula o delta. Linhas marcadas para exclusão não entram na comparação;
/// linhas sem par no baseline são ignoradas (inclusão é sempre via `insert`).
pub fn compute_delta<'a>(edited: &'a [EditedRow], baseline: &'a [CustomerRecord]) -> Delta<'a> {
    let by_id: HashMap<i64, &CustomerRecord> = baseline.iter().map(|r| (r.id, r)).collect();
    let mut delta = Delta::default();
    let mut seen_deletes = HashSet::new();

    for row in edited {
        let id = row.record.id;
        if row.delete {
            if seen_deletes.insert(id) {
                delta.deletes.push(id);
            }
            continue;
        }

        let Some(&original) = by_id.get(&id) else {
            tracing::debug!("Linha {} fora do baseline ignorada na reconciliação.", id);
            continue;
        };

        let mut fields: Vec<&'static str> = comparable(&row.record.fields)
            .text_view()
            .into_iter()
            .zip(comparable(&original.fields).text_view())
            .filter(|((_, new), (_, old))| new != old)
            .map(|((name, _), _)| name)
            .collect();
        if row.record.registered_at != original.registered_at {
            fields.push("registeredAt");
        }

        if !fields.is_empty() {
            tracing::debug!("Linha {} alterada: {:?}", id, fields);
            delta.changed.push(ChangedRow {
                edited: &row.record,
                baseline: original,
                fields,
            });
        }
    }

    delta
}

// Forma canônica quando a linha é válida; só mudança de máscara não conta como edição.
// Linha inválida é comparada como veio, para cair na revalidação.
fn comparable(fields: &CustomerFields) -> CustomerFields {
    validate_customer(fields)
        .map(ValidatedCustomer::into_fields)
        .unwrap_or_else(|_| fields.normalized())
}

/// O "Diff Reconciler": compara, revalida e entrega o delta ao `CustomerService`.
#[derive(Clone)]
pub struct ReconcileService {
    customers: CustomerService,
}

impl ReconcileService {
    pub fn new(customers: CustomerService) -> Self {
        Self { customers }
    }

    /// Sem diferenças é um no-op que devolve zeros. Qualquer linha inválida
    /// aborta tudo, e o erro traz todas as linhas/campos que falharam.
    pub async fn reconcile(
        &self,
        edited: &[EditedRow],
        baseline: &[CustomerRecord],
    ) -> Result<ReconcileSummary, AppError> {
        let delta = compute_delta(edited, baseline);
        if delta.is_empty() {
            return Ok(ReconcileSummary::default());
        }

        let mut report = ValidationReport::default();
        let mut updates = Vec::with_capacity(delta.changed.len());

        for change in &delta.changed {
            let id = change.edited.id;
            if change.edited.registered_at != change.baseline.registered_at {
                report.push(Violation::for_row(id, "registeredAt", ViolationKind::Immutable));
            }
            match validate_customer(&change.edited.fields) {
                Ok(customer) => updates.push((id, customer)),
                Err(row_report) => report.extend(row_report.for_row(id)),
            }
        }

        if !report.is_empty() {
            tracing::warn!("Erro de validação ao salvar: {}", report);
            return Err(report.into());
        }

        self.customers.apply_changes(&updates, &delta.deletes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::DocumentType;
    use chrono::NaiveDate;

    fn record(id: i64, name: &str) -> CustomerRecord {
        CustomerRecord {
            id,
            fields: CustomerFields {
                full_name: Some(name.into()),
                document_type: Some(DocumentType::Cpf),
                cpf: Some("111.444.777-35".into()),
                ..Default::default()
            },
            registered_at: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    #[test]
    fn identical_sets_produce_empty_delta() {
        let baseline = vec![record(1, "Ana"), record(2, "Bia")];
        let edited: Vec<EditedRow> = baseline.iter().cloned().map(EditedRow::from).collect();
        assert!(compute_delta(&edited, &baseline).is_empty());
    }

    #[test]
    fn comparison_is_string_normalized() {
        let baseline = vec![record(1, "Ana")];
        let mut row = EditedRow::from(record(1, "  Ana "));
        row.record.fields.notes = Some(String::new());
        assert!(compute_delta(&[row], &baseline).is_empty());
    }

    #[test]
    fn mask_only_edits_are_not_changes() {
        let baseline = vec![record(1, "Ana")];
        let mut row = EditedRow::from(record(1, "Ana"));
        row.record.fields.cpf = Some("11144477735".into());

        let edited = vec![row];
        assert!(compute_delta(&edited, &baseline).is_empty());
    }

    #[test]
    fn invalid_edits_still_count_as_changes() {
        let baseline = vec![record(1, "Ana")];
        let mut row = EditedRow::from(record(1, "Ana"));
        row.record.fields.cpf = Some("111.444.777-36".into());

        let edited = vec![row];
        let delta = compute_delta(&edited, &baseline);
        assert_eq!(delta.changed[0].fields, vec!["cpf"]);
    }

    #[test]
    fn reports_changed_fields() {
        let baseline = vec![record(1, "Ana"), record(2, "Bia")];
        let mut changed = EditedRow::from(record(2, "Beatriz"));
        changed.record.fields.city = Some("Curitiba".into());
        let edited = vec![EditedRow::from(record(1, "Ana")), changed];

        let delta = compute_delta(&edited, &baseline);
        assert_eq!(delta.changed.len(), 1);
        assert_eq!(delta.changed[0].edited.id, 2);
        assert_eq!(delta.changed[0].fields, vec!["fullName", "city"]);
        assert!(delta.deletes.is_empty());
    }

    #[test]
    fn deleted_rows_skip_comparison() {
        let baseline = vec![record(1, "Ana")];
        let mut row = EditedRow::from(record(1, "Outro nome"));
        row.delete = true;

        let edited = vec![row.clone(), row];
        let delta = compute_delta(&edited, &baseline);
        assert!(delta.changed.is_empty());
        assert_eq!(delta.deletes, vec![1]);
    }

    #[test]
    fn rows_outside_baseline_are_ignored() {
        let baseline = vec![record(1, "Ana")];
        let edited = vec![EditedRow::from(record(99, "Nova"))];
        assert!(compute_delta(&edited, &baseline).is_empty());
    }

    #[test]
    fn registered_at_change_is_detected() {
        let baseline = vec![record(1, "Ana")];
        let mut row = EditedRow::from(record(1, "Ana"));
        row.record.registered_at = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let edited = vec![row];
        let delta = compute_delta(&edited, &baseline);
        assert_eq!(delta.changed[0].fields, vec!["registeredAt"]);
    }
}
