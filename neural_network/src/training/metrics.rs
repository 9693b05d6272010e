use crate::{MlErr, Result, tensor::Tensor};

/// Computes the fraction of predictions whose greatest value is where the target's is.
///
/// # Arguments
/// * `predictions` - The network outputs.
/// * `targets` - The expected outputs, one per prediction.
///
/// # Returns
/// The accuracy in `[0, 1]`, `0` when there are no predictions, or an error if the amounts
/// differ.
pub fn accuracy(predictions: &[Tensor], targets: &[Tensor]) -> Result<f32> {
    if predictions.len() != targets.len() {
        return Err(MlErr::SizeMismatch {
            what: "accuracy targets",
            got: targets.len(),
            expected: predictions.len(),
        });
    }

    if predictions.is_empty() {
        return Ok(0.);
    }

    let hits = predictions
        .iter()
        .zip(targets)
        .filter(|(prediction, target)| prediction.argmax() == target.argmax())
        .count();

    Ok(hits as f32 / predictions.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Shape;

    fn row(values: &[f32]) -> Tensor {
        Tensor::from_vec(Shape::d1(values.len()), values.to_vec()).unwrap()
    }

    #[test]
    fn counts_matching_arg_maxes() {
        let predictions = [row(&[0.9, 0.1]), row(&[0.2, 0.8])];
        let targets = [row(&[1., 0.]), row(&[0., 1.])];
        assert_eq!(accuracy(&predictions, &targets).unwrap(), 1.);

        let targets = [row(&[1., 0.]), row(&[1., 0.])];
        assert_eq!(accuracy(&predictions, &targets).unwrap(), 0.5);
    }

    #[test]
    fn rejects_unpaired_inputs() {
        assert!(accuracy(&[row(&[1.])], &[]).is_err());
        assert_eq!(accuracy(&[], &[]).unwrap(), 0.);
    }
}
