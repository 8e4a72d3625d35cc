//! The form for creating a new expense.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

/// The values the create form is rendered with.
///
/// Kept as raw strings so a rejected submission can be re-rendered with
/// exactly what the user typed, including a cost expression that did not
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExpenseFormValues {
    pub expense_name: String,
    pub expense_details: String,
    pub cost: String,
}

/// Render the create-expense form.
///
/// `name_suggestions` feeds a datalist so previously used names autocomplete.
/// `error_message` renders as an inline panel above the submit button and is
/// kept until the next submission.
pub(crate) fn create_expense_form(
    values: &ExpenseFormValues,
    name_suggestions: &[String],
    error_message: Option<&str>,
    page: u64,
    page_size: u64,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-encoding="multipart/form-data"
            hx-target="#expenses-content"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 w-full max-w-md"
        {
            input type="hidden" name="page" value=(page);
            input type="hidden" name="page_size" value=(page_size);

            div
            {
                label for="expense_name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="expense_name"
                    id="expense_name"
                    list="expense-name-suggestions"
                    placeholder="Coffee"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.expense_name);

                datalist id="expense-name-suggestions"
                {
                    @for name in name_suggestions {
                        option value=(name) {}
                    }
                }
            }

            div
            {
                label for="expense_details" class=(FORM_LABEL_STYLE) { "Details" }

                input
                    type="text"
                    name="expense_details"
                    id="expense_details"
                    placeholder="Flat white at the corner cafe"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(values.expense_details);
            }

            div
            {
                label for="cost" class=(FORM_LABEL_STYLE) { "Cost" }

                div class="input-wrapper"
                {
                    input
                        type="text"
                        name="cost"
                        id="cost"
                        inputmode="decimal"
                        placeholder="12.50*3 + 4"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        value=(values.cost);
                }

                p class="text-xs text-gray-500 dark:text-gray-400 mt-1"
                {
                    "Plain amounts and arithmetic like 12.50*3 + 4 are both accepted."
                }
            }

            div
            {
                label for="expense_image" class=(FORM_LABEL_STYLE) { "Receipt image (optional)" }

                input
                    type="file"
                    name="expense_image"
                    id="expense_image"
                    accept="image/*"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message
            {
                div
                    data-form-error="true"
                    class="p-3 rounded text-sm text-red-800 bg-red-50
                        dark:bg-gray-700 dark:text-red-400"
                {
                    p { (error_message) }
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add expense"
            }
        }
    }
}
