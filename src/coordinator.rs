//! View state shared by the list, saved and compare views.
//!
//! Every remote failure is returned to the caller with local state left as it
//! was, so the user can simply repeat the action.

use crate::api::{PropertyApi, PropertyFilter, SaveReceipt};
use crate::comparison::{self, Comparison};
use crate::error::{ComparisonError, CoordinatorError, TransportError};
use crate::models::{ComparisonPair, Prediction, Property, PropertyId};
use crate::selection::{Selection, Toggle};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Coordinator {
    api: Arc<dyn PropertyApi>,
    session_id: String,
    properties: Vec<Property>,
    saved: Vec<Property>,
    predictions: HashMap<PropertyId, Prediction>,
    selection: Selection,
}

impl Coordinator {
    pub fn new(api: Arc<dyn PropertyApi>, session_id: impl Into<String>) -> Self {
        Self {
            api,
            session_id: session_id.into(),
            properties: Vec::new(),
            saved: Vec::new(),
            predictions: HashMap::new(),
            selection: Selection::new(),
        }
    }

    /// Listings currently on display
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn saved(&self) -> &[Property] {
        &self.saved
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub async fn refresh_properties(&mut self) -> Result<usize, TransportError> {
        let list = self.api.list_properties().await?;
        info!("Fetched {} properties", list.properties.len());
        self.properties = list.properties;
        Ok(self.properties.len())
    }

    pub async fn search(&mut self, filter: &PropertyFilter) -> Result<usize, TransportError> {
        debug!(?filter, "Searching properties");
        let list = self.api.search_properties(filter).await?;
        info!("Search matched {} properties", list.properties.len());
        self.properties = list.properties;
        Ok(self.properties.len())
    }

    /// Replace the displayed listings with ones the assistant found
    pub fn show_found(&mut self, found: Vec<Property>) {
        debug!("Showing {} properties from chat", found.len());
        self.properties = found;
    }

    pub async fn refresh_saved(&mut self) -> Result<usize, TransportError> {
        let list = self.api.list_saved(&self.session_id).await?;
        self.saved = list.properties;
        Ok(self.saved.len())
    }

    /// Save a listing; on success the saved list is reloaded
    pub async fn save(&mut self, id: PropertyId) -> Result<SaveReceipt, TransportError> {
        let receipt = self.api.save_property(id, &self.session_id).await?;
        info!(id, "{}", receipt.message);
        if receipt.is_saved() {
            if let Err(e) = self.refresh_saved().await {
                warn!("Saved property {} but could not reload saved list: {}", id, e);
            }
        }
        Ok(receipt)
    }

    /// Fetch a price prediction, reusing one already fetched for `id`
    pub async fn predict(&mut self, id: PropertyId) -> Result<Prediction, TransportError> {
        if let Some(cached) = self.predictions.get(&id) {
            return Ok(cached.clone());
        }
        let prediction = Prediction::from(self.api.predict_price(id).await?);
        self.predictions.insert(id, prediction.clone());
        Ok(prediction)
    }

    pub fn prediction(&self, id: PropertyId) -> Option<&Prediction> {
        self.predictions.get(&id)
    }

    fn find(&self, id: PropertyId) -> Option<&Property> {
        self.properties
            .iter()
            .chain(self.saved.iter())
            .find(|p| p.id == id)
    }

    /// The listing with any fetched prediction attached
    pub fn property(&self, id: PropertyId) -> Option<Property> {
        let property = self.find(id)?;
        Some(match self.predictions.get(&id) {
            Some(prediction) => property.with_prediction(prediction.clone()),
            None => property.clone(),
        })
    }

    /// Toggle a listing in the compare set. Only listings on display or saved
    /// can be picked; a current pick can always be dropped.
    pub fn toggle_selection(&mut self, id: PropertyId) -> Result<Toggle, CoordinatorError> {
        if !self.selection.is_selected(id) && self.find(id).is_none() {
            return Err(CoordinatorError::UnknownProperty(id));
        }
        Ok(self.selection.toggle(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Fetch the selected pair and compare it, first pick on the left.
    ///
    /// The service answers in its own storage order, so the records are
    /// matched back to the picks by id.
    pub async fn open_compare(&self) -> Result<Comparison, CoordinatorError> {
        let (a, b) = self.selection.request_compare()?;
        let pair = self.api.compare_properties(a, b).await?;
        let pair = match (pair.first.id, pair.second.id) {
            (x, y) if x == a && y == b => pair,
            (x, y) if x == b && y == a => ComparisonPair {
                first: pair.second,
                second: pair.first,
            },
            (x, y) => {
                return Err(ComparisonError::InvalidComparisonInput(format!(
                    "asked for {} and {}, service returned {} and {}",
                    a, b, x, y
                ))
                .into())
            }
        };
        Ok(comparison::compute_pair(&pair)?)
    }
}
