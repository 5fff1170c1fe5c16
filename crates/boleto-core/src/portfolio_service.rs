use tracing::debug;
use uuid::Uuid;

use boleto_domain::{Boleto, Identifiable};

use crate::{CoreError, CoreResult};

/// Collection-level transforms over the portfolio.
///
/// The portfolio is an ordered `Vec<Boleto>`, newest first. Each operation
/// returns the next collection and leaves its input untouched.
pub struct PortfolioService;

impl PortfolioService {
    /// Prepends `boleto` so the most recently registered one is listed first.
    pub fn add(portfolio: &[Boleto], boleto: Boleto) -> Vec<Boleto> {
        debug!(id = %boleto.id, client = %boleto.client_name, "adding boleto");
        let mut next = Vec::with_capacity(portfolio.len() + 1);
        next.push(boleto);
        next.extend_from_slice(portfolio);
        next
    }

    /// Swaps in `boleto` at the position of the entry sharing its id.
    pub fn replace(portfolio: &[Boleto], boleto: Boleto) -> CoreResult<Vec<Boleto>> {
        let position = Self::position(portfolio, boleto.id)?;
        let mut next = portfolio.to_vec();
        debug!(id = %boleto.id, position, "replacing boleto");
        next[position] = boleto;
        Ok(next)
    }

    pub fn remove(portfolio: &[Boleto], id: Uuid) -> CoreResult<Vec<Boleto>> {
        let position = Self::position(portfolio, id)?;
        let mut next = portfolio.to_vec();
        next.remove(position);
        debug!(%id, remaining = next.len(), "removed boleto");
        Ok(next)
    }

    pub fn get(portfolio: &[Boleto], id: Uuid) -> CoreResult<&Boleto> {
        Self::find(portfolio, id).ok_or(CoreError::BoletoNotFound(id))
    }

    pub fn find(portfolio: &[Boleto], id: Uuid) -> Option<&Boleto> {
        portfolio.iter().find(|boleto| boleto.id() == id)
    }

    /// Applies a boleto transform to the entry with `id` and commits the result.
    pub fn update<F>(portfolio: &[Boleto], id: Uuid, transform: F) -> CoreResult<Vec<Boleto>>
    where
        F: FnOnce(&Boleto) -> CoreResult<Boleto>,
    {
        let current = Self::get(portfolio, id)?;
        let next = transform(current)?;
        Self::replace(portfolio, next)
    }

    /// Resolves an id or a unique id prefix (as printed in listings).
    pub fn resolve_id(portfolio: &[Boleto], needle: &str) -> CoreResult<Uuid> {
        let needle = needle.trim().to_ascii_lowercase();
        if let Ok(id) = Uuid::parse_str(&needle) {
            return Self::get(portfolio, id).map(|boleto| boleto.id);
        }
        let mut matches = portfolio
            .iter()
            .filter(|boleto| !needle.is_empty() && boleto.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(boleto), None) => Ok(boleto.id),
            (Some(_), Some(_)) => Err(CoreError::AmbiguousIdPrefix(needle)),
            (None, _) => Err(CoreError::UnknownIdPrefix(needle)),
        }
    }

    fn position(portfolio: &[Boleto], id: Uuid) -> CoreResult<usize> {
        portfolio
            .iter()
            .position(|boleto| boleto.id == id)
            .ok_or(CoreError::BoletoNotFound(id))
    }
}
