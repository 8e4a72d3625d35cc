//! HTML rendering for the expenses page.

use maud::{Markup, html};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    api::models::{Expense, ExpensePage},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationIndicator, create_pagination_indicators, total_pages},
};

/// The max number of graphemes to display in the details column before
/// truncating and displaying ellipses.
const MAX_DETAILS_GRAPHEMES: usize = 32;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[day] [month repr:short] [year]");

/// Render the full expenses page document.
pub(crate) fn expenses_view(content: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let page_content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (content)
        }
    };

    base("Expenses", &[dollar_input_styles()], &page_content)
}

/// Render the `#expenses-content` section: the create form, the expense
/// table, and the pagination controls.
///
/// This is both the body of the full page and the fragment returned by the
/// create and delete endpoints.
pub(crate) fn expenses_content(
    expense_page: &ExpensePage,
    page: u64,
    page_size: u64,
    max_pages: u64,
    form: &Markup,
) -> Markup {
    let page_count = total_pages(expense_page.total_count, page_size);

    html! {
        section class="space-y-4" id="expenses-content"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Expenses" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (expense_page.total_count) " recorded"
                }
            }

            section class="rounded bg-gray-50 dark:bg-gray-800 p-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                (form)
            }

            section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                (expense_table(&expense_page.items, page, page_size))

                @if page_count > 1 {
                    (pagination_nav(page, page_count, max_pages, page_size))
                }
            }
        }
    }
}

fn expense_table(expenses: &[Expense], page: u64, page_size: u64) -> Markup {
    html! {
        table class="w-full my-2 text-sm text-left rtl:text-right
            text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Image" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Details" }
                    th scope="col" class="px-6 py-3 text-right" { "Cost" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for expense in expenses {
                    (expense_row(expense, page, page_size))
                }

                @if expenses.is_empty() {
                    tr
                    {
                        td
                            colspan="6"
                            data-empty-state="true"
                            class="px-6 py-4 text-center"
                        {
                            "No expenses recorded yet."
                        }
                    }
                }
            }
        }
    }
}

fn expense_row(expense: &Expense, page: u64, page_size: u64) -> Markup {
    let details = expense.expense_details.as_deref().unwrap_or_default();
    let delete_url = format!(
        "{}?page={page}&page_size={page_size}",
        format_endpoint(endpoints::DELETE_EXPENSE, expense.id)
    );
    let date = expense
        .date_created
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| expense.date_created.date().to_string());

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(image_path) = &expense.image_path {
                    img
                        src=(image_path)
                        alt={ "Receipt for " (expense.expense_name) }
                        loading="lazy"
                        class="h-12 w-12 object-cover rounded";
                } @else {
                    span class="text-gray-400" { "No image" }
                }
            }

            td class=(TABLE_CELL_STYLE) { (expense.expense_name) }

            td class=(TABLE_CELL_STYLE) title=(details)
            {
                (truncate_text(details, MAX_DETAILS_GRAPHEMES))
            }

            td class="px-6 py-4 text-right" { (format_currency(expense.cost)) }

            td class=(TABLE_CELL_STYLE) { (date) }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_url)
                    hx-target="#expenses-content"
                    hx-target-error="#alert-container"
                    hx-swap="outerHTML"
                    hx-confirm={ "Delete \"" (expense.expense_name) "\"?" }
                {
                    "Delete"
                }
            }
        }
    }
}

fn truncate_text(text: &str, max_graphemes: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();

    if graphemes.len() <= max_graphemes {
        return text.to_owned();
    }

    let mut truncated: String = graphemes[..max_graphemes].concat();
    truncated.push('…');
    truncated
}

fn page_url(page: u64, page_size: u64) -> String {
    format!(
        "{}?page={page}&page_size={page_size}",
        endpoints::EXPENSES_VIEW
    )
}

fn pagination_nav(curr_page: u64, page_count: u64, max_pages: u64, page_size: u64) -> Markup {
    let indicators = create_pagination_indicators(curr_page, page_count, max_pages);

    let page_link_class = "px-3 py-1 rounded hover:bg-gray-200 dark:hover:bg-gray-700";
    let curr_page_class = "px-3 py-1 rounded bg-blue-600 text-white";

    html! {
        nav class="pagination" aria-label="Expense pages"
        {
            ul class="pagination flex flex-wrap justify-center gap-1 my-2 text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(page, page_size)) class=(page_link_class)
                                {
                                    "Previous"
                                }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(page, page_size)) class=(page_link_class)
                                {
                                    (page)
                                }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(curr_page_class) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-1" { "…" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(page, page_size)) class=(page_link_class)
                                {
                                    "Next"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
